//! HTTP transport
//!
//! [`HttpTransport`] sends exactly one HTTP request. The [`Executor`] on top
//! of it follows redirects, logs exchanges and records the final response
//! on the [`Request`].

use crate::config::{ClientConfig, TransportOptions};
use crate::error::{SparqlClientError, SparqlClientResult};
use crate::sparql::request::form_urlencode;
use crate::sparql::Request;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Method, Url};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Wire-level request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    /// Parameters appended to `url` when sending
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// `url` with `query` appended
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.to_string();
        }
        let separator = if self.url.query().is_some() { '&' } else { '?' };
        format!(
            "{}{separator}{}",
            self.url,
            form_urlencode(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        )
    }
}

/// Wire-level response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Builder-style header, failing on an invalid name or value
    pub fn with_header(mut self, name: &str, value: &str) -> SparqlClientResult<Self> {
        let invalid = |reason: String| SparqlClientError::InvalidHeader {
            name: name.to_string(),
            reason,
        };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }
}

/// Sends one HTTP request, never following redirects itself
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> SparqlClientResult<HttpResponse>;
}

/// Transport backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(options: &TransportOptions) -> SparqlClientResult<Self> {
        let mut builder = Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = options.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = options.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> SparqlClientResult<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.full_url())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Executes requests: redirects, logging, response recording
pub struct Executor<'a> {
    transport: &'a dyn HttpTransport,
    max_redirects: usize,
    logging: bool,
}

impl<'a> Executor<'a> {
    pub fn new(transport: &'a dyn HttpTransport, config: &ClientConfig) -> Self {
        Self {
            transport,
            max_redirects: config.max_redirects,
            logging: config.logging,
        }
    }

    /// Send `request` and record the final response on it.
    ///
    /// Status codes are not interpreted beyond redirects.
    pub async fn execute(&self, request: &mut Request) -> SparqlClientResult<HttpResponse> {
        let mut http = request.to_http()?;
        let started = Instant::now();
        let mut redirects = 0;

        loop {
            debug!(method = %http.method, url = %http.full_url(), "sending SPARQL request");
            let response = self.transport.send(&http).await?;

            match redirect(&http, &response)? {
                Some(_) if redirects >= self.max_redirects => {
                    warn!(max_redirects = self.max_redirects, url = %http.url, "too many redirects");
                    return Err(SparqlClientError::TooManyRedirects(self.max_redirects));
                }
                Some(next) => {
                    debug!(status = response.status, location = %next.url, "following redirect");
                    redirects += 1;
                    http = next;
                }
                None => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    if self.logging {
                        info!(
                            method = %http.method,
                            url = %http.url,
                            status = response.status,
                            elapsed_ms,
                            "SPARQL {}",
                            request.operation
                        );
                    } else {
                        debug!(status = response.status, elapsed_ms, "SPARQL response");
                    }
                    request.record_response(&response);
                    return Ok(response);
                }
            }
        }
    }
}

/// Next hop of a redirect response, if it is one
fn redirect(request: &HttpRequest, response: &HttpResponse) -> SparqlClientResult<Option<HttpRequest>> {
    if !matches!(response.status, 301 | 302 | 303 | 307 | 308) {
        return Ok(None);
    }
    let Some(location) = response.location() else {
        return Ok(None);
    };
    let url = request
        .url
        .join(location)
        .map_err(|e| SparqlClientError::invalid_option("location", format!("{location} ({e})")))?;

    let mut next = request.clone();
    if matches!(response.status, 301 | 302 | 303) {
        next.query.clear();
    }
    if response.status == 303 {
        next.method = Method::GET;
        next.body = None;
        next.headers.remove(CONTENT_TYPE);
    }
    if url.host_str() != request.url.host_str() || url.port_or_known_default() != request.url.port_or_known_default() {
        next.headers.remove(AUTHORIZATION);
    }
    next.url = url;
    Ok(Some(next))
}
