//! Client configuration
//!
//! Built once, owned by a [`SparqlClient`](crate::SparqlClient) and read on
//! every call. Can be loaded from YAML:
//!
//! ```yaml
//! protocol_version: "1.1"
//! query_request_method: post
//! update_request_method: url_encoded
//! result_formats:
//!   select: xml
//! http_headers:
//!   Authorization: Bearer secret
//! transport:
//!   timeout_secs: 30
//! max_redirects: 3
//! logging: true
//! ```

use crate::error::SparqlClientResult;
use crate::sparql::{ProtocolVersion, QueryForm, Request, RequestMethod, ResultFormat, UpdateRequestMethod};
use indexmap::IndexMap;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Callback computing extra headers from the request and its computed headers
pub type HeaderCallback = Arc<dyn Fn(&Request, &HeaderMap) -> HeaderMap + Send + Sync>;

/// Headers added to every request, below computed and per-call headers
#[derive(Clone, Deserialize)]
#[serde(from = "IndexMap<String, String>")]
pub enum DefaultHeaders {
    Static(IndexMap<String, String>),
    Dynamic(HeaderCallback),
}

impl DefaultHeaders {
    pub fn dynamic<F>(callback: F) -> Self
    where
        F: Fn(&Request, &HeaderMap) -> HeaderMap + Send + Sync + 'static,
    {
        DefaultHeaders::Dynamic(Arc::new(callback))
    }
}

impl From<IndexMap<String, String>> for DefaultHeaders {
    fn from(headers: IndexMap<String, String>) -> Self {
        DefaultHeaders::Static(headers)
    }
}

impl fmt::Debug for DefaultHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultHeaders::Static(headers) => f.debug_tuple("Static").field(headers).finish(),
            DefaultHeaders::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Options handed to the HTTP transport
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Whole request timeout
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl TransportOptions {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

/// Client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Default protocol version of queries
    pub protocol_version: Option<ProtocolVersion>,
    /// Default HTTP method of queries
    pub query_request_method: Option<RequestMethod>,
    /// Default wire shape of updates
    pub update_request_method: UpdateRequestMethod,
    /// Default result format per query form
    pub result_formats: IndexMap<QueryForm, ResultFormat>,
    pub http_headers: Option<DefaultHeaders>,
    pub transport: TransportOptions,
    /// Redirects followed before giving up
    pub max_redirects: usize,
    /// Skip query parsing and allow raw update strings
    pub raw_mode: bool,
    /// Log every exchange at info level
    pub logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            protocol_version: None,
            query_request_method: None,
            update_request_method: UpdateRequestMethod::default(),
            result_formats: IndexMap::new(),
            http_headers: None,
            transport: TransportOptions::default(),
            max_redirects: 5,
            raw_mode: false,
            logging: false,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML configuration
    pub fn from_yaml_str(yaml: &str) -> SparqlClientResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a YAML configuration file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> SparqlClientResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn with_protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.protocol_version = Some(version);
        self
    }

    pub fn with_query_request_method(mut self, method: RequestMethod) -> Self {
        self.query_request_method = Some(method);
        self
    }

    pub fn with_update_request_method(mut self, method: UpdateRequestMethod) -> Self {
        self.update_request_method = method;
        self
    }

    pub fn with_result_format(mut self, form: QueryForm, format: ResultFormat) -> Self {
        self.result_formats.insert(form, format);
        self
    }

    pub fn with_headers(mut self, headers: IndexMap<String, String>) -> Self {
        self.http_headers = Some(DefaultHeaders::Static(headers));
        self
    }

    pub fn with_dynamic_headers<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Request, &HeaderMap) -> HeaderMap + Send + Sync + 'static,
    {
        self.http_headers = Some(DefaultHeaders::dynamic(callback));
        self
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_raw_mode(mut self, raw_mode: bool) -> Self {
        self.raw_mode = raw_mode;
        self
    }

    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.max_redirects, 5);
        assert!(!config.raw_mode);
        assert_eq!(config.update_request_method, UpdateRequestMethod::Direct);
        assert!(config.http_headers.is_none());
    }

    #[test]
    fn test_from_yaml() {
        let config = ClientConfig::from_yaml_str(
            r#"
protocol_version: "1.0"
query_request_method: post
update_request_method: url_encoded
result_formats:
  select: xml
  construct: ntriples
http_headers:
  Authorization: Bearer secret
transport:
  timeout_secs: 30
max_redirects: 2
raw_mode: true
"#,
        )
        .unwrap();

        assert_eq!(config.protocol_version, Some(ProtocolVersion::V1_0));
        assert_eq!(config.query_request_method, Some(RequestMethod::Post));
        assert_eq!(config.update_request_method, UpdateRequestMethod::UrlEncoded);
        assert_eq!(config.result_formats.get(&QueryForm::Select), Some(&ResultFormat::Xml));
        assert_eq!(
            config.result_formats.get(&QueryForm::Construct),
            Some(&ResultFormat::NTriples)
        );
        assert!(matches!(
            &config.http_headers,
            Some(DefaultHeaders::Static(h)) if h["Authorization"] == "Bearer secret"
        ));
        assert_eq!(config.transport.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.max_redirects, 2);
        assert!(config.raw_mode);
        assert!(!config.logging);
    }

    #[test]
    fn test_invalid_yaml_value() {
        assert!(ClientConfig::from_yaml_str("protocol_version: \"2.0\"").is_err());
        assert!(ClientConfig::from_yaml_str("result_formats: {select: html}").is_err());
    }
}
