//! Error types for the SPARQL client

use crate::rdf::{ParseError, RdfError, SerializeError};
use crate::sparql::{ProtocolVersion, QueryForm, Request, RequestMethod};
use thiserror::Error;

/// Errors that can occur when talking to a SPARQL endpoint
#[derive(Error, Debug)]
pub enum SparqlClientError {
    /// Option value outside of its allowed set
    #[error("invalid {option} value: {value}")]
    InvalidOption { option: &'static str, value: String },

    /// Method and protocol version can't be combined
    #[error("request method {method} is not supported with SPARQL protocol version {version}")]
    UnsupportedProtocol {
        method: RequestMethod,
        version: ProtocolVersion,
    },

    /// Result format requested for a query form that can't carry it
    #[error("{format} is not a valid result format for {form} queries")]
    UnsupportedResultFormat { format: String, form: QueryForm },

    /// The generic `query` needs the parsed form to pick a decoder
    #[error("the query function can not be used in raw mode, use select, ask, construct or describe instead")]
    QueryInRawMode,

    /// Hand-written update text is only sent in raw mode
    #[error("update strings are not validated, sending them requires raw mode")]
    RawModeRequired,

    /// Query text is not valid SPARQL
    #[error("invalid SPARQL query: {0}")]
    QuerySyntax(#[from] spargebra::SparqlSyntaxError),

    /// Parsed query form differs from the called function
    #[error("expected a {expected} query, got a {actual} query")]
    QueryFormMismatch { expected: QueryForm, actual: QueryForm },

    /// Decoded response does not have the shape of the called form
    #[error("{form} query answered with a {kind} result")]
    UnexpectedResult { form: QueryForm, kind: &'static str },

    /// 2xx response in a media type no decoder is registered for
    #[error(
        "SPARQL service responded with {media_type} content which can't be interpreted. \
         Try specifying one of the supported result formats with the result_format option."
    )]
    ContentNegotiation { media_type: String },

    /// Non-2xx response
    #[error("SPARQL service responded with HTTP status {status} to {request}")]
    Http { status: u16, request: Box<Request> },

    #[error("stopped after {0} redirects")]
    TooManyRedirects(usize),

    /// Connection, TLS or timeout failure
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid HTTP header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error(transparent)]
    ResultsSyntax(#[from] sparesults::QueryResultsSyntaxError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    RdfParse(#[from] ParseError),

    #[error(transparent)]
    RdfSerialize(#[from] SerializeError),

    #[error(transparent)]
    Rdf(#[from] RdfError),

    /// Configuration file error
    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SparqlClientError {
    pub(crate) fn invalid_option(option: &'static str, value: impl Into<String>) -> Self {
        SparqlClientError::InvalidOption {
            option,
            value: value.into(),
        }
    }

    pub(crate) fn http(request: Request) -> Self {
        SparqlClientError::Http {
            status: request.status.unwrap_or_default(),
            request: Box::new(request),
        }
    }

    /// HTTP status of a failed exchange
    pub fn status(&self) -> Option<u16> {
        match self {
            SparqlClientError::Http { status, .. } => Some(*status),
            SparqlClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The outbound request of a failed exchange
    pub fn request(&self) -> Option<&Request> {
        match self {
            SparqlClientError::Http { request, .. } => Some(request),
            _ => None,
        }
    }
}

pub type SparqlClientResult<T> = Result<T, SparqlClientError>;
