//! Per-call options of queries and updates
//!
//! Unset values fall back to the client configuration.

use super::{ProtocolVersion, RequestMethod, ResultFormat, UpdateRequestMethod};
use crate::rdf::{NamedNode, PrefixMap};

/// Dataset parameters (`default-graph-uri` / `named-graph-uri` for queries,
/// `using-graph-uri` / `using-named-graph-uri` for updates)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetOptions {
    pub default_graphs: Vec<NamedNode>,
    pub named_graphs: Vec<NamedNode>,
}

impl DatasetOptions {
    pub fn is_empty(&self) -> bool {
        self.default_graphs.is_empty() && self.named_graphs.is_empty()
    }

    /// One `(key, iri)` pair per graph, default graphs first, in option order
    pub fn params(&self, keys: (&'static str, &'static str)) -> Vec<(&'static str, String)> {
        let (default_key, named_key) = keys;
        self.default_graphs
            .iter()
            .map(|g| (default_key, g.as_str().to_string()))
            .chain(
                self.named_graphs
                    .iter()
                    .map(|g| (named_key, g.as_str().to_string())),
            )
            .collect()
    }
}

/// Options of a SPARQL query
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub protocol_version: Option<ProtocolVersion>,
    pub request_method: Option<RequestMethod>,
    /// Format to ask for, and to decode with when the response media type is unknown
    pub result_format: Option<ResultFormat>,
    /// Sent verbatim, bypassing result format validation
    pub accept_header: Option<String>,
    /// Custom headers, winning over every computed or configured header
    pub headers: Vec<(String, String)>,
    pub dataset: DatasetOptions,
    /// Send the query without parsing it
    pub raw_mode: Option<bool>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.protocol_version = Some(version);
        self
    }

    pub fn with_request_method(mut self, method: RequestMethod) -> Self {
        self.request_method = Some(method);
        self
    }

    pub fn with_result_format(mut self, format: ResultFormat) -> Self {
        self.result_format = Some(format);
        self
    }

    pub fn with_accept_header(mut self, accept: impl Into<String>) -> Self {
        self.accept_header = Some(accept.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_default_graph(mut self, graph: NamedNode) -> Self {
        self.dataset.default_graphs.push(graph);
        self
    }

    pub fn with_named_graph(mut self, graph: NamedNode) -> Self {
        self.dataset.named_graphs.push(graph);
        self
    }

    pub fn raw(mut self, raw_mode: bool) -> Self {
        self.raw_mode = Some(raw_mode);
        self
    }
}

/// Options of a SPARQL update
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub request_method: Option<UpdateRequestMethod>,
    pub headers: Vec<(String, String)>,
    pub dataset: DatasetOptions,
    /// Prologue of `INSERT DATA` / `DELETE DATA`, replacing the data's own prefixes
    pub prefixes: Option<PrefixMap>,
    /// Flatten all graphs of the data into one block instead of `GRAPH` blocks
    pub merge_graphs: bool,
    /// Add `SILENT` to graph management operations
    pub silent: bool,
    pub raw_mode: Option<bool>,
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_method(mut self, method: UpdateRequestMethod) -> Self {
        self.request_method = Some(method);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_using_graph(mut self, graph: NamedNode) -> Self {
        self.dataset.default_graphs.push(graph);
        self
    }

    pub fn with_using_named_graph(mut self, graph: NamedNode) -> Self {
        self.dataset.named_graphs.push(graph);
        self
    }

    pub fn with_prefixes(mut self, prefixes: PrefixMap) -> Self {
        self.prefixes = Some(prefixes);
        self
    }

    pub fn merge_graphs(mut self, merge: bool) -> Self {
        self.merge_graphs = merge;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn raw(mut self, raw_mode: bool) -> Self {
        self.raw_mode = Some(raw_mode);
        self
    }
}
