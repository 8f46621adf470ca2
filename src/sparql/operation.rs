//! Operation strategies
//!
//! A strategy decides how one kind of operation goes on the wire (method,
//! protocol version, headers, parameter names) and how its response is read.

use super::format::media_type_essence;
use super::{
    OperationType, ProtocolVersion, QueryForm, QueryOptions, Request, RequestMethod,
    ResultFormat, SparqlResults, UpdateForm, UpdateOptions, UpdateRequestMethod,
};
use crate::config::ClientConfig;
use crate::error::{SparqlClientError, SparqlClientResult};
use crate::transport::HttpResponse;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::debug;

pub const SPARQL_QUERY_MEDIA_TYPE: &str = "application/sparql-query";
pub const SPARQL_UPDATE_MEDIA_TYPE: &str = "application/sparql-update";
pub const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Assumed when a response has no Content-Type
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

pub trait OperationStrategy {
    /// Value produced from a successful response
    type Output;

    fn operation_type(&self) -> OperationType;

    /// Parameter carrying the operation text in URL-encoded requests
    fn query_parameter_key(&self) -> &'static str;

    /// Parameter names of default and named dataset graphs
    fn dataset_parameter_keys(&self) -> (&'static str, &'static str);

    /// Resolve protocol version, method, content type and accept header
    fn init(&self, request: &mut Request) -> SparqlClientResult<()>;

    /// Operation-specific headers of an initialized request
    fn build_headers(&self, request: &Request) -> SparqlClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = &request.content_type {
            headers.insert(CONTENT_TYPE, header_value("Content-Type", content_type)?);
        }
        if let Some(accept) = &request.accept {
            headers.insert(ACCEPT, header_value("Accept", accept)?);
        }
        Ok(headers)
    }

    /// Turn the final response into the operation's result
    fn evaluate_response(
        &self,
        request: &Request,
        response: &HttpResponse,
    ) -> SparqlClientResult<Self::Output>;
}

fn header_value(name: &str, value: &str) -> SparqlClientResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| SparqlClientError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// SELECT, ASK, CONSTRUCT and DESCRIBE queries
#[derive(Debug, Clone)]
pub struct QueryOperation {
    form: QueryForm,
    protocol_version: Option<ProtocolVersion>,
    request_method: Option<RequestMethod>,
    result_format: Option<ResultFormat>,
    accept_header: Option<String>,
}

impl QueryOperation {
    /// Per-call options, falling back to the configuration.
    ///
    /// Version and method travel as a pair: configured values only apply
    /// when the call sets neither.
    pub fn new(form: QueryForm, options: &QueryOptions, config: &ClientConfig) -> Self {
        let (protocol_version, request_method) =
            if options.protocol_version.is_some() || options.request_method.is_some() {
                (options.protocol_version, options.request_method)
            } else {
                (config.protocol_version, config.query_request_method)
            };
        Self {
            form,
            protocol_version,
            request_method,
            result_format: options
                .result_format
                .or_else(|| config.result_formats.get(&form).copied()),
            accept_header: options.accept_header.clone(),
        }
    }

    pub fn form(&self) -> QueryForm {
        self.form
    }

    fn accept_header(&self) -> SparqlClientResult<String> {
        if let Some(accept) = &self.accept_header {
            return Ok(accept.clone());
        }
        match self.result_format {
            Some(format) => Ok(format.validate_for(self.form)?.media_type().to_string()),
            None => Ok(self.form.default_accept_header().to_string()),
        }
    }
}

impl OperationStrategy for QueryOperation {
    type Output = SparqlResults;

    fn operation_type(&self) -> OperationType {
        OperationType::Query(self.form)
    }

    fn query_parameter_key(&self) -> &'static str {
        "query"
    }

    fn dataset_parameter_keys(&self) -> (&'static str, &'static str) {
        ("default-graph-uri", "named-graph-uri")
    }

    fn init(&self, request: &mut Request) -> SparqlClientResult<()> {
        let (version, method) = ProtocolVersion::resolve(self.protocol_version, self.request_method)?;

        request.protocol_version = version;
        request.method = method;
        request.content_type = match (method, version) {
            (RequestMethod::Get, _) => None,
            (RequestMethod::Post, ProtocolVersion::V1_1) => Some(SPARQL_QUERY_MEDIA_TYPE.to_string()),
            (RequestMethod::Post, ProtocolVersion::V1_0) => Some(FORM_MEDIA_TYPE.to_string()),
        };
        request.accept = Some(self.accept_header()?);
        Ok(())
    }

    fn evaluate_response(
        &self,
        request: &Request,
        response: &HttpResponse,
    ) -> SparqlClientResult<SparqlResults> {
        if !response.is_success() {
            return Err(SparqlClientError::http(request.clone()));
        }

        let media_type = media_type_essence(response.content_type().unwrap_or(UNKNOWN_MEDIA_TYPE));
        // Servers answering in an unregistered media type are decoded with
        // the requested format, if there is one.
        let format = ResultFormat::from_media_type(&media_type, self.form)
            .or(self.result_format)
            .ok_or_else(|| SparqlClientError::ContentNegotiation {
                media_type: media_type.clone(),
            })?;

        debug!(form = %self.form, %media_type, %format, "decoding query response");
        format.decode(&response.body)
    }
}

/// INSERT DATA, DELETE DATA, graph management and raw updates
#[derive(Debug, Clone)]
pub struct UpdateOperation {
    form: UpdateForm,
    request_method: UpdateRequestMethod,
}

impl UpdateOperation {
    pub fn new(form: UpdateForm, options: &UpdateOptions, config: &ClientConfig) -> Self {
        Self {
            form,
            request_method: options.request_method.unwrap_or(config.update_request_method),
        }
    }

    pub fn form(&self) -> UpdateForm {
        self.form
    }
}

impl OperationStrategy for UpdateOperation {
    type Output = ();

    fn operation_type(&self) -> OperationType {
        OperationType::Update(self.form)
    }

    fn query_parameter_key(&self) -> &'static str {
        "update"
    }

    fn dataset_parameter_keys(&self) -> (&'static str, &'static str) {
        ("using-graph-uri", "using-named-graph-uri")
    }

    fn init(&self, request: &mut Request) -> SparqlClientResult<()> {
        request.protocol_version = self.request_method.protocol_version();
        request.method = RequestMethod::Post;
        request.content_type = Some(
            match self.request_method {
                UpdateRequestMethod::Direct => SPARQL_UPDATE_MEDIA_TYPE,
                UpdateRequestMethod::UrlEncoded => FORM_MEDIA_TYPE,
            }
            .to_string(),
        );
        request.accept = None;
        Ok(())
    }

    fn evaluate_response(&self, request: &Request, response: &HttpResponse) -> SparqlClientResult<()> {
        if response.is_success() {
            Ok(())
        } else {
            Err(SparqlClientError::http(request.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_request(operation: &QueryOperation) -> SparqlClientResult<Request> {
        let mut request = Request::new("http://example.org/sparql", operation.operation_type(), "ASK {}");
        operation.init(&mut request)?;
        Ok(request)
    }

    #[test]
    fn test_query_content_types() {
        let config = ClientConfig::default();
        let cases = [
            (RequestMethod::Get, ProtocolVersion::V1_1, None),
            (RequestMethod::Post, ProtocolVersion::V1_1, Some(SPARQL_QUERY_MEDIA_TYPE)),
            (RequestMethod::Post, ProtocolVersion::V1_0, Some(FORM_MEDIA_TYPE)),
        ];
        for (method, version, content_type) in cases {
            let options = QueryOptions::new()
                .with_request_method(method)
                .with_protocol_version(version);
            let request = query_request(&QueryOperation::new(QueryForm::Ask, &options, &config)).unwrap();
            assert_eq!(request.method, method);
            assert_eq!(request.protocol_version, version);
            assert_eq!(request.content_type.as_deref(), content_type);
        }
    }

    #[test]
    fn test_accept_header_priority() {
        let config = ClientConfig::default().with_result_format(QueryForm::Select, ResultFormat::Xml);

        let operation = QueryOperation::new(QueryForm::Select, &QueryOptions::new(), &config);
        let request = query_request(&operation).unwrap();
        assert_eq!(request.accept.as_deref(), Some("application/sparql-results+xml"));

        let options = QueryOptions::new().with_result_format(ResultFormat::Tsv);
        let request = query_request(&QueryOperation::new(QueryForm::Select, &options, &config)).unwrap();
        assert_eq!(request.accept.as_deref(), Some("text/tab-separated-values"));

        let options = QueryOptions::new()
            .with_result_format(ResultFormat::Csv)
            .with_accept_header("text/plain");
        let request = query_request(&QueryOperation::new(QueryForm::Ask, &options, &config)).unwrap();
        assert_eq!(request.accept.as_deref(), Some("text/plain"));

        let request = query_request(&QueryOperation::new(
            QueryForm::Describe,
            &QueryOptions::new(),
            &config,
        ))
        .unwrap();
        assert_eq!(request.accept.as_deref(), Some(QueryForm::Describe.default_accept_header()));
    }

    #[test]
    fn test_invalid_result_format_fails_init() {
        let options = QueryOptions::new().with_result_format(ResultFormat::Csv);
        let operation = QueryOperation::new(QueryForm::Ask, &options, &ClientConfig::default());
        assert!(matches!(
            query_request(&operation),
            Err(SparqlClientError::UnsupportedResultFormat { form: QueryForm::Ask, .. })
        ));
    }

    #[test]
    fn test_config_protocol_defaults() {
        let config = ClientConfig::default().with_protocol_version(ProtocolVersion::V1_0);
        let operation = QueryOperation::new(QueryForm::Select, &QueryOptions::new(), &config);
        let request = query_request(&operation).unwrap();
        assert_eq!(request.method, RequestMethod::Post);

        // a per-call method replaces the configured pair
        let options = QueryOptions::new().with_request_method(RequestMethod::Get);
        let operation = QueryOperation::new(QueryForm::Select, &options, &config);
        let request = query_request(&operation).unwrap();
        assert_eq!(request.method, RequestMethod::Get);
        assert_eq!(request.protocol_version, ProtocolVersion::V1_1);

        let config = ClientConfig::default().with_query_request_method(RequestMethod::Get);
        let options = QueryOptions::new().with_protocol_version(ProtocolVersion::V1_0);
        let operation = QueryOperation::new(QueryForm::Select, &options, &config);
        let request = query_request(&operation).unwrap();
        assert_eq!(request.method, RequestMethod::Post);
        assert_eq!(request.protocol_version, ProtocolVersion::V1_0);
    }

    #[test]
    fn test_update_request_methods() {
        let config = ClientConfig::default();
        let direct = UpdateOperation::new(UpdateForm::Clear, &UpdateOptions::new(), &config);
        let mut request = Request::new("http://example.org/sparql", direct.operation_type(), "CLEAR ALL");
        direct.init(&mut request).unwrap();
        assert_eq!(request.protocol_version, ProtocolVersion::V1_1);
        assert_eq!(request.content_type.as_deref(), Some(SPARQL_UPDATE_MEDIA_TYPE));
        assert!(request.accept.is_none());

        let options = UpdateOptions::new().with_request_method(UpdateRequestMethod::UrlEncoded);
        let encoded = UpdateOperation::new(UpdateForm::Clear, &options, &config);
        encoded.init(&mut request).unwrap();
        assert_eq!(request.protocol_version, ProtocolVersion::V1_0);
        assert_eq!(request.method, RequestMethod::Post);
        assert_eq!(request.content_type.as_deref(), Some(FORM_MEDIA_TYPE));
    }

    #[test]
    fn test_evaluate_content_negotiation() {
        let config = ClientConfig::default();
        let turtle = "<http://example.org/s> <http://example.org/p> <http://example.org/o> .";
        let response = HttpResponse::new(200)
            .with_header("content-type", "text/html; charset=utf-8").unwrap()
            .with_body(turtle);

        let operation = QueryOperation::new(QueryForm::Construct, &QueryOptions::new(), &config);
        let request = query_request(&operation).unwrap();
        let err = operation.evaluate_response(&request, &response).unwrap_err();
        assert!(matches!(&err, SparqlClientError::ContentNegotiation { media_type } if media_type == "text/html"));

        let options = QueryOptions::new().with_result_format(ResultFormat::Turtle);
        let operation = QueryOperation::new(QueryForm::Construct, &options, &config);
        let results = operation.evaluate_response(&request, &response).unwrap();
        assert!(matches!(results, SparqlResults::Graph(graph) if graph.len() == 1));
    }

    #[test]
    fn test_evaluate_non_success() {
        let config = ClientConfig::default();
        let operation = UpdateOperation::new(UpdateForm::Generic, &UpdateOptions::new(), &config);
        let mut request = Request::new("http://example.org/sparql", operation.operation_type(), "x");
        let response = HttpResponse::new(400).with_body("bad update");
        request.record_response(&response);

        let err = operation.evaluate_response(&request, &response).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.request().map(|r| r.endpoint.as_str()), Some("http://example.org/sparql"));
    }
}
