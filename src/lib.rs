//! SPARQL 1.1 Protocol client
//!
//! Sends SPARQL queries and updates to remote endpoints over HTTP and
//! interprets the responses according to the query or update form and the
//! content type the server answered with.
//!
//! # Architecture
//!
//! - [`rdf`]: RDF terms, `Graph` / `Dataset` containers and codecs
//! - [`sparql`]: forms, result formats, the update builder, operation
//!   strategies and the request pipeline
//! - [`transport`]: pluggable HTTP transport and the redirect-following executor
//! - [`config`]: immutable client configuration
//! - [`SparqlClient`]: the public entry points
//!
//! ## Example Usage
//!
//! ```no_run
//! use sparql_client::rdf::{Graph, Literal, NamedNode, RdfPredicate, Triple};
//! use sparql_client::{ClientConfig, QueryOptions, SparqlClient, UpdateOptions};
//!
//! # async fn run() -> sparql_client::SparqlClientResult<()> {
//! let client = SparqlClient::new(ClientConfig::default())?;
//! let endpoint = "http://localhost:3030/ds/sparql";
//!
//! let alice = NamedNode::new("http://example.org/alice")?;
//! let name = RdfPredicate::new("http://xmlns.com/foaf/0.1/name")?;
//! let graph = Graph::new().with_triple(Triple::new(
//!     alice.into(),
//!     name,
//!     Literal::new_simple_literal("Alice").into(),
//! ));
//! client.insert_data(endpoint, graph, &UpdateOptions::new()).await?;
//!
//! let found = client
//!     .ask(endpoint, "ASK { ?s ?p \"Alice\" }", &QueryOptions::new())
//!     .await?;
//! assert!(found);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod rdf;
pub mod sparql;
pub mod transport;

mod client;

pub use client::SparqlClient;
pub use config::{ClientConfig, DefaultHeaders, TransportOptions};
pub use error::{SparqlClientError, SparqlClientResult};
pub use sparql::{
    DatasetOptions, GraphSelector, ProtocolVersion, QueryForm, QueryOptions, RequestMethod,
    ResultFormat, Solutions, SparqlResults, UpdateOptions, UpdateRequestMethod,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
