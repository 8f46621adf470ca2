//! RDF/XML through rio_xml

use super::turtle::{collect_triples, rio_triple};
use super::{ParseResult, SerializeError, SerializeResult};
use crate::rdf::Graph;
use rio_api::formatter::TriplesFormatter;
use rio_xml::{RdfXmlFormatter, RdfXmlParser};

pub fn parse(input: &[u8]) -> ParseResult<Graph> {
    let mut parser = RdfXmlParser::new(input, None);
    collect_triples(&mut parser)
}

pub fn serialize(graph: &Graph) -> SerializeResult<String> {
    let mut output = Vec::new();
    let mut formatter = RdfXmlFormatter::new(&mut output)?;

    for triple in graph.triples() {
        formatter.format(&rio_triple(triple))?;
    }
    formatter.finish()?;

    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}
