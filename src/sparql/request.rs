//! Request model and construction pipeline
//!
//! A [`Request`] is built fresh for every call:
//! 1. endpoint and operation identity
//! 2. strategy `init` (protocol version, method, content type, accept)
//! 3. header merge: configured defaults < computed headers < per-call headers
//! 4. dataset parameters
//!
//! Building never does I/O. The executor later records the response on it.

use super::{DatasetOptions, OperationStrategy, OperationType, ProtocolVersion, RequestMethod};
use crate::config::DefaultHeaders;
use crate::error::{SparqlClientError, SparqlClientResult};
use crate::transport::{HttpRequest, HttpResponse};
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use std::fmt;
use tracing::debug;

/// Characters left as they are in URL and form encoding
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// `key=value&...` with both sides percent-encoded
pub(crate) fn form_urlencode<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, FORM_ENCODE_SET),
                utf8_percent_encode(v, FORM_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Body of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// GET requests
    Empty,
    /// `application/x-www-form-urlencoded` parameters
    Form(String),
    /// Operation text as it is (`application/sparql-query` / `application/sparql-update`)
    Raw(String),
}

/// One SPARQL protocol exchange
#[derive(Debug, Clone)]
pub struct Request {
    pub endpoint: String,
    pub operation: OperationType,
    /// Query or update text
    pub payload: String,
    pub protocol_version: ProtocolVersion,
    pub method: RequestMethod,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    /// Headers sent, after merging
    pub headers: HeaderMap,
    /// `(parameter, graph IRI)` pairs in option order
    pub dataset_params: Vec<(&'static str, String)>,
    /// `query` or `update`
    pub query_parameter_key: &'static str,

    pub status: Option<u16>,
    pub response_content_type: Option<String>,
    pub response_body: Option<Bytes>,
}

impl Request {
    /// Bare request, before any strategy ran
    pub fn new(endpoint: impl Into<String>, operation: OperationType, payload: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            operation,
            payload: payload.into(),
            protocol_version: ProtocolVersion::V1_1,
            method: RequestMethod::Get,
            content_type: None,
            accept: None,
            headers: HeaderMap::new(),
            dataset_params: Vec::new(),
            query_parameter_key: if operation.is_query() { "query" } else { "update" },
            status: None,
            response_content_type: None,
            response_body: None,
        }
    }

    /// Run the construction pipeline for `strategy`
    pub fn build<S: OperationStrategy>(
        strategy: &S,
        endpoint: &str,
        payload: impl Into<String>,
        headers: &[(String, String)],
        dataset: &DatasetOptions,
        default_headers: Option<&DefaultHeaders>,
    ) -> SparqlClientResult<Self> {
        Url::parse(endpoint).map_err(|e| {
            SparqlClientError::invalid_option("endpoint", format!("{endpoint} ({e})"))
        })?;

        let mut request = Request::new(endpoint, strategy.operation_type(), payload);
        request.query_parameter_key = strategy.query_parameter_key();
        strategy.init(&mut request)?;

        let computed = strategy.build_headers(&request)?;
        request.headers = request.merge_headers(computed, headers, default_headers)?;
        request.dataset_params = dataset.params(strategy.dataset_parameter_keys());

        debug!(
            operation = %request.operation,
            method = %request.method,
            protocol_version = %request.protocol_version,
            endpoint = %request.endpoint,
            "built SPARQL request"
        );
        Ok(request)
    }

    fn merge_headers(
        &self,
        computed: HeaderMap,
        user: &[(String, String)],
        default_headers: Option<&DefaultHeaders>,
    ) -> SparqlClientResult<HeaderMap> {
        let mut merged = match default_headers {
            None => HeaderMap::new(),
            Some(DefaultHeaders::Static(headers)) => {
                header_map(headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))?
            }
            Some(DefaultHeaders::Dynamic(callback)) => callback(self, &computed),
        };

        // `extend` replaces every value of a key it brings
        merged.extend(computed);
        merged.extend(header_map(user.iter().map(|(k, v)| (k.as_str(), v.as_str())))?);
        Ok(merged)
    }

    /// Parameters placed in the URL query string
    pub fn url_params(&self) -> Vec<(&str, &str)> {
        let dataset = self.dataset_params.iter().map(|(k, v)| (*k, v.as_str()));
        match (self.method, self.protocol_version) {
            (RequestMethod::Get, _) => std::iter::once((self.query_parameter_key, self.payload.as_str()))
                .chain(dataset)
                .collect(),
            (RequestMethod::Post, ProtocolVersion::V1_1) => dataset.collect(),
            (RequestMethod::Post, ProtocolVersion::V1_0) => Vec::new(),
        }
    }

    pub fn body(&self) -> RequestBody {
        match (self.method, self.protocol_version) {
            (RequestMethod::Get, _) => RequestBody::Empty,
            (RequestMethod::Post, ProtocolVersion::V1_1) => RequestBody::Raw(self.payload.clone()),
            (RequestMethod::Post, ProtocolVersion::V1_0) => RequestBody::Form(form_urlencode(
                std::iter::once((self.query_parameter_key, self.payload.as_str()))
                    .chain(self.dataset_params.iter().map(|(k, v)| (*k, v.as_str()))),
            )),
        }
    }

    /// Endpoint with the URL parameters appended
    pub fn url(&self) -> String {
        let params = self.url_params();
        if params.is_empty() {
            return self.endpoint.clone();
        }
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{separator}{}", self.endpoint, form_urlencode(params))
    }

    /// Wire-level request handed to the transport
    pub fn to_http(&self) -> SparqlClientResult<HttpRequest> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| SparqlClientError::invalid_option("endpoint", format!("{} ({e})", self.endpoint)))?;
        let method = match self.method {
            RequestMethod::Get => Method::GET,
            RequestMethod::Post => Method::POST,
        };
        let body = match self.body() {
            RequestBody::Empty => None,
            RequestBody::Form(body) | RequestBody::Raw(body) => Some(Bytes::from(body)),
        };

        Ok(HttpRequest {
            method,
            url,
            query: self
                .url_params()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: self.headers.clone(),
            body,
        })
    }

    /// Keep the final response of the exchange
    pub fn record_response(&mut self, response: &HttpResponse) {
        self.status = Some(response.status);
        self.response_content_type = response.content_type().map(str::to_string);
        self.response_body = Some(response.body.clone());
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)
    }
}

fn header_map<'a>(headers: impl IntoIterator<Item = (&'a str, &'a str)>) -> SparqlClientResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let invalid = |reason: String| SparqlClientError::InvalidHeader {
            name: name.to_string(),
            reason,
        };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.append(header_name, header_value);
    }
    Ok(map)
}
