//! SPARQL 1.1 Protocol operations
//!
//! This module turns queries and updates into protocol requests and
//! interprets the responses:
//! - query and update forms, protocol versions and request methods
//! - the result format registry and result decoders
//! - the update builder (`INSERT DATA`, `LOAD`, `CLEAR`, ...)
//! - operation strategies and the request pipeline
//!
//! # Example
//!
//! ```rust
//! use sparql_client::sparql::{ProtocolVersion, RequestMethod};
//!
//! let (version, method) = ProtocolVersion::resolve(Some(ProtocolVersion::V1_0), None).unwrap();
//! assert_eq!(version, ProtocolVersion::V1_0);
//! assert_eq!(method, RequestMethod::Post);
//! ```

mod format;
mod operation;
mod options;
pub(crate) mod request;
mod results;
pub mod update;

pub use format::ResultFormat;
pub use operation::{OperationStrategy, QueryOperation, UpdateOperation};
pub use options::{DatasetOptions, QueryOptions, UpdateOptions};
pub use request::{Request, RequestBody};
pub use results::{QuerySolution, Solutions, SparqlResults};
pub use update::{GraphSelector, UpdateData};

use crate::error::{SparqlClientError, SparqlClientResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SPARQL query form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryForm {
    Select,
    Ask,
    Construct,
    Describe,
}

impl QueryForm {
    pub const ALL: [QueryForm; 4] = [
        QueryForm::Select,
        QueryForm::Ask,
        QueryForm::Construct,
        QueryForm::Describe,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QueryForm::Select => "select",
            QueryForm::Ask => "ask",
            QueryForm::Construct => "construct",
            QueryForm::Describe => "describe",
        }
    }

    /// Whether the form yields an RDF graph instead of a tuple result
    pub fn is_graph_form(self) -> bool {
        matches!(self, QueryForm::Construct | QueryForm::Describe)
    }

    /// Quality-weighted Accept header sent when no format was requested
    pub fn default_accept_header(self) -> &'static str {
        match self {
            QueryForm::Select => {
                "application/sparql-results+json, application/sparql-results+xml, \
                 text/tab-separated-values;q=0.8, text/csv;q=0.2, */*;q=0.1"
            }
            QueryForm::Ask => {
                "application/sparql-results+json, application/sparql-results+xml, */*;q=0.1"
            }
            QueryForm::Construct | QueryForm::Describe => {
                "text/turtle, application/n-triples, application/n-quads, \
                 application/ld+json, */*;q=0.1"
            }
        }
    }

    /// Form of a parsed query
    pub fn of(query: &spargebra::Query) -> Self {
        match query {
            spargebra::Query::Select { .. } => QueryForm::Select,
            spargebra::Query::Ask { .. } => QueryForm::Ask,
            spargebra::Query::Construct { .. } => QueryForm::Construct,
            spargebra::Query::Describe { .. } => QueryForm::Describe,
        }
    }
}

impl fmt::Display for QueryForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueryForm {
    type Err = SparqlClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SparqlClientError::invalid_option("query_form", s))
    }
}

/// SPARQL update form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateForm {
    InsertData,
    DeleteData,
    Load,
    Clear,
    Create,
    Drop,
    Copy,
    Move,
    Add,
    /// Hand-written update text
    Generic,
}

impl UpdateForm {
    pub fn name(self) -> &'static str {
        match self {
            UpdateForm::InsertData => "insert_data",
            UpdateForm::DeleteData => "delete_data",
            UpdateForm::Load => "load",
            UpdateForm::Clear => "clear",
            UpdateForm::Create => "create",
            UpdateForm::Drop => "drop",
            UpdateForm::Copy => "copy",
            UpdateForm::Move => "move",
            UpdateForm::Add => "add",
            UpdateForm::Generic => "update",
        }
    }

    /// Leading keyword(s) of the generated update
    pub fn keyword(self) -> &'static str {
        match self {
            UpdateForm::InsertData => "INSERT DATA",
            UpdateForm::DeleteData => "DELETE DATA",
            UpdateForm::Load => "LOAD",
            UpdateForm::Clear => "CLEAR",
            UpdateForm::Create => "CREATE",
            UpdateForm::Drop => "DROP",
            UpdateForm::Copy => "COPY",
            UpdateForm::Move => "MOVE",
            UpdateForm::Add => "ADD",
            UpdateForm::Generic => "",
        }
    }
}

impl fmt::Display for UpdateForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of operation carried by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query(QueryForm),
    Update(UpdateForm),
}

impl OperationType {
    pub fn is_query(self) -> bool {
        matches!(self, OperationType::Query(_))
    }

    /// Name of the form, e.g. `select` or `insert_data`
    pub fn form_name(self) -> &'static str {
        match self {
            OperationType::Query(form) => form.name(),
            OperationType::Update(form) => form.name(),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Query(form) => write!(f, "{form} query"),
            OperationType::Update(form) => write!(f, "{form} update"),
        }
    }
}

/// SPARQL protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[serde(rename = "1.0")]
    V1_0,
    #[serde(rename = "1.1")]
    V1_1,
}

impl ProtocolVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolVersion::V1_0 => "1.0",
            ProtocolVersion::V1_1 => "1.1",
        }
    }

    /// Resolve the effective (version, method) pair of a query request.
    ///
    /// A missing half is derived from the other one, `(1.1, GET)` when
    /// neither is given. `(1.0, GET)` is the only rejected combination.
    pub fn resolve(
        version: Option<ProtocolVersion>,
        method: Option<RequestMethod>,
    ) -> SparqlClientResult<(ProtocolVersion, RequestMethod)> {
        use ProtocolVersion::*;
        use RequestMethod::*;

        match (version, method) {
            (None, None) | (Some(V1_1), None) | (None, Some(Get)) => Ok((V1_1, Get)),
            (Some(V1_0), None) | (None, Some(Post)) => Ok((V1_0, Post)),
            (Some(V1_1), Some(Get)) => Ok((V1_1, Get)),
            (Some(V1_0), Some(Post)) => Ok((V1_0, Post)),
            (Some(V1_1), Some(Post)) => Ok((V1_1, Post)),
            (Some(version), Some(method)) => {
                Err(SparqlClientError::UnsupportedProtocol { method, version })
            }
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolVersion {
    type Err = SparqlClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.0" => Ok(ProtocolVersion::V1_0),
            "1.1" => Ok(ProtocolVersion::V1_1),
            other => Err(SparqlClientError::invalid_option("protocol_version", other)),
        }
    }
}

/// HTTP method of a query request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = SparqlClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("get") {
            Ok(RequestMethod::Get)
        } else if s.eq_ignore_ascii_case("post") {
            Ok(RequestMethod::Post)
        } else {
            Err(SparqlClientError::invalid_option("request_method", s))
        }
    }
}

/// Way an update is put on the wire; both are POST requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRequestMethod {
    /// Raw body with `application/sparql-update` (protocol 1.1)
    #[default]
    Direct,
    /// `update=` form body (protocol 1.0)
    UrlEncoded,
}

impl UpdateRequestMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateRequestMethod::Direct => "direct",
            UpdateRequestMethod::UrlEncoded => "url_encoded",
        }
    }

    pub fn protocol_version(self) -> ProtocolVersion {
        match self {
            UpdateRequestMethod::Direct => ProtocolVersion::V1_1,
            UpdateRequestMethod::UrlEncoded => ProtocolVersion::V1_0,
        }
    }
}

impl fmt::Display for UpdateRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateRequestMethod {
    type Err = SparqlClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(UpdateRequestMethod::Direct),
            "url_encoded" | "url-encoded" => Ok(UpdateRequestMethod::UrlEncoded),
            other => Err(SparqlClientError::invalid_option("request_method", other)),
        }
    }
}
