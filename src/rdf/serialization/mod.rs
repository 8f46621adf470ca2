//! RDF serialization formats
//!
//! Supports:
//! - Turtle (TTL)
//! - N-Triples (NT)
//! - N-Quads (NQ)
//! - RDF/XML
//! - JSON-LD (expanded / flattened documents, no context processing)

mod jsonld;
mod rdfxml;
mod turtle;

use super::{Dataset, Graph};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
    /// N-Quads format (.nq)
    NQuads,
    /// RDF/XML format (.rdf)
    RdfXml,
    /// JSON-LD format (.jsonld)
    JsonLd,
}

impl RdfFormat {
    pub const ALL: [RdfFormat; 5] = [
        RdfFormat::Turtle,
        RdfFormat::NTriples,
        RdfFormat::NQuads,
        RdfFormat::RdfXml,
        RdfFormat::JsonLd,
    ];

    /// Canonical media type
    pub fn media_type(self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::NQuads => "application/n-quads",
            RdfFormat::RdfXml => "application/rdf+xml",
            RdfFormat::JsonLd => "application/ld+json",
        }
    }

    /// Short name used in options and on the command line
    pub fn name(self) -> &'static str {
        match self {
            RdfFormat::Turtle => "turtle",
            RdfFormat::NTriples => "ntriples",
            RdfFormat::NQuads => "nquads",
            RdfFormat::RdfXml => "rdfxml",
            RdfFormat::JsonLd => "jsonld",
        }
    }

    /// Whether the format can carry named graphs
    pub fn supports_datasets(self) -> bool {
        matches!(self, RdfFormat::NQuads | RdfFormat::JsonLd)
    }

    pub fn from_media_type(media_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.media_type().eq_ignore_ascii_case(media_type))
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RdfFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::Parse(format!("unknown RDF format: {s}")))
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// The document holds named graphs but a single graph was requested
    #[error("{0} document contains named graphs")]
    UnexpectedNamedGraph(RdfFormat),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Named graphs can't be written in a triple-only format
    #[error("{0} can't serialize named graphs")]
    UnsupportedFormat(RdfFormat),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// RDF parser
pub struct RdfParser;

impl RdfParser {
    /// Parse a document into a dataset; triple formats fill the default graph
    pub fn parse_dataset(input: &[u8], format: RdfFormat) -> ParseResult<Dataset> {
        match format {
            RdfFormat::Turtle => Ok(Dataset::from(turtle::parse_turtle(input)?)),
            RdfFormat::NTriples => Ok(Dataset::from(turtle::parse_ntriples(input)?)),
            RdfFormat::NQuads => turtle::parse_nquads(input),
            RdfFormat::RdfXml => Ok(Dataset::from(rdfxml::parse(input)?)),
            RdfFormat::JsonLd => jsonld::JsonLdParserWrapper::parse(input),
        }
    }

    /// Parse a document into a single unnamed graph
    pub fn parse_graph(input: &[u8], format: RdfFormat) -> ParseResult<Graph> {
        match format {
            RdfFormat::Turtle => turtle::parse_turtle(input),
            RdfFormat::NTriples => turtle::parse_ntriples(input),
            RdfFormat::RdfXml => rdfxml::parse(input),
            RdfFormat::NQuads | RdfFormat::JsonLd => {
                let dataset = Self::parse_dataset(input, format)?;
                if dataset.named_graphs().any(|g| !g.is_empty()) {
                    return Err(ParseError::UnexpectedNamedGraph(format));
                }
                Ok(dataset.default_graph().clone())
            }
        }
    }
}

/// RDF serializer
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize the triples of a graph
    pub fn serialize_graph(graph: &Graph, format: RdfFormat) -> SerializeResult<String> {
        match format {
            RdfFormat::Turtle => turtle::TurtleSerializerWrapper::serialize(graph),
            RdfFormat::NTriples => turtle::serialize_ntriples(graph),
            RdfFormat::NQuads => turtle::serialize_nquads(&Dataset::from(graph.clone())),
            RdfFormat::RdfXml => rdfxml::serialize(graph),
            RdfFormat::JsonLd => jsonld::JsonLdSerializerWrapper::serialize(&Dataset::from(graph.clone())),
        }
    }

    /// Serialize a dataset; triple formats only accept datasets without named graphs
    pub fn serialize_dataset(dataset: &Dataset, format: RdfFormat) -> SerializeResult<String> {
        match format {
            RdfFormat::NQuads => turtle::serialize_nquads(dataset),
            RdfFormat::JsonLd => jsonld::JsonLdSerializerWrapper::serialize(dataset),
            _ if dataset.named_graphs().any(|g| !g.is_empty()) => {
                Err(SerializeError::UnsupportedFormat(format))
            }
            _ => Self::serialize_graph(dataset.default_graph(), format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_types() {
        assert_eq!(RdfFormat::from_media_type("text/turtle"), Some(RdfFormat::Turtle));
        assert_eq!(
            RdfFormat::from_media_type("Application/N-Triples"),
            Some(RdfFormat::NTriples)
        );
        assert_eq!(RdfFormat::from_media_type("text/html"), None);
    }

    #[test]
    fn test_parse_graph_rejects_named_graphs() {
        let input = b"<http://example.org/s> <http://example.org/p> <http://example.org/o> <http://example.org/g> .\n";
        assert!(matches!(
            RdfParser::parse_graph(input, RdfFormat::NQuads),
            Err(ParseError::UnexpectedNamedGraph(RdfFormat::NQuads))
        ));
        let dataset = RdfParser::parse_dataset(input, RdfFormat::NQuads).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_triple_format_refuses_named_graphs() {
        let input = b"<http://example.org/s> <http://example.org/p> <http://example.org/o> <http://example.org/g> .\n";
        let dataset = RdfParser::parse_dataset(input, RdfFormat::NQuads).unwrap();
        assert!(matches!(
            RdfSerializer::serialize_dataset(&dataset, RdfFormat::Turtle),
            Err(SerializeError::UnsupportedFormat(RdfFormat::Turtle))
        ));
    }
}
