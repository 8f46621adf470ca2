//! RDF data model used by the SPARQL client
//!
//! This module provides:
//! - RDF terms, triples and quads (wrappers around `oxrdf`)
//! - Prefix maps used for update prologues
//! - `Description`, `Graph` and `Dataset` containers
//! - RDF serialization formats (Turtle, N-Triples, N-Quads, RDF/XML, JSON-LD)
//!
//! # Example
//!
//! ```rust
//! use sparql_client::rdf::{Graph, Literal, NamedNode, RdfFormat, RdfPredicate, Triple};
//!
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let object = Literal::new_simple_literal("Alice");
//!
//! let graph = Graph::new().with_triple(Triple::new(subject.into(), predicate, object.into()));
//! let ntriples = graph.serialize(RdfFormat::NTriples).unwrap();
//! assert!(ntriples.contains("\"Alice\""));
//! ```

mod graph;
mod namespace;
mod serialization;
mod types;

pub use types::{
    BlankNode, IntoIri, Literal, NamedNode, Quad, RdfError, RdfObject, RdfPredicate, RdfResult,
    RdfSubject, RdfTerm, Triple,
};

pub use graph::{Dataset, Description, Graph};

pub use namespace::{Namespace, PrefixError, PrefixMap, PrefixResult};

pub use serialization::{
    ParseError, ParseResult, RdfFormat, RdfParser, RdfSerializer, SerializeError,
    SerializeResult,
};

impl Graph {
    /// Serialize this graph in the given format
    pub fn serialize(&self, format: RdfFormat) -> SerializeResult<String> {
        RdfSerializer::serialize_graph(self, format)
    }
}

impl Dataset {
    /// Serialize this dataset in the given format
    ///
    /// Triple-only formats fail when the dataset has non-empty named graphs.
    pub fn serialize(&self, format: RdfFormat) -> SerializeResult<String> {
        RdfSerializer::serialize_dataset(self, format)
    }
}
