//! Turtle, N-Triples and N-Quads through rio_turtle

use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use crate::rdf::{
    BlankNode, Dataset, Graph, Literal, NamedNode, Quad, RdfObject, RdfPredicate, RdfSubject,
    Triple,
};
use rio_api::formatter::{QuadsFormatter, TriplesFormatter};
use rio_api::parser::{QuadsParser, TriplesParser};
use rio_turtle::{
    NQuadsFormatter, NQuadsParser, NTriplesFormatter, NTriplesParser, TurtleError,
    TurtleFormatter, TurtleParser,
};

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Parse a Turtle document
pub fn parse_turtle(input: &[u8]) -> ParseResult<Graph> {
    let mut parser = TurtleParser::new(input, None);
    collect_triples(&mut parser)
}

/// Parse an N-Triples document
pub fn parse_ntriples(input: &[u8]) -> ParseResult<Graph> {
    let mut parser = NTriplesParser::new(input);
    collect_triples(&mut parser)
}

/// Parse an N-Quads document
pub fn parse_nquads(input: &[u8]) -> ParseResult<Dataset> {
    let mut parser = NQuadsParser::new(input);
    let mut dataset = Dataset::new();

    let res: Result<(), TurtleError> = parser.parse_all(&mut |q| {
        let quad = convert_quad(q).map_err(invalid_data)?;
        dataset.insert(quad);
        Ok(())
    });

    res.map_err(|e| ParseError::Parse(e.to_string()))?;
    Ok(dataset)
}

pub(super) fn collect_triples<P, E>(parser: &mut P) -> ParseResult<Graph>
where
    P: TriplesParser<Error = E>,
    E: From<std::io::Error> + std::fmt::Display,
{
    let mut graph = Graph::new();

    let res: Result<(), E> = parser.parse_all(&mut |t| {
        let triple = convert_triple(t).map_err(invalid_data)?;
        graph.insert(triple);
        Ok(())
    });

    res.map_err(|e| ParseError::Parse(e.to_string()))?;
    Ok(graph)
}

fn invalid_data(e: ParseError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
}

/// Turtle serializer
pub struct TurtleSerializerWrapper;

impl TurtleSerializerWrapper {
    /// Serialize a graph to a Turtle string
    pub fn serialize(graph: &Graph) -> SerializeResult<String> {
        let mut output = Vec::new();
        let mut formatter = TurtleFormatter::new(&mut output);

        for triple in graph.triples() {
            formatter
                .format(&rio_triple(triple))
                .map_err(|e| SerializeError::Serialize(e.to_string()))?;
        }

        formatter
            .finish()
            .map_err(|e| SerializeError::Serialize(e.to_string()))?;

        String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
    }
}

/// Serialize a graph to N-Triples
pub fn serialize_ntriples(graph: &Graph) -> SerializeResult<String> {
    let mut output = Vec::new();
    let mut formatter = NTriplesFormatter::new(&mut output);

    for triple in graph.triples() {
        formatter.format(&rio_triple(triple))?;
    }
    formatter.finish()?;

    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}

/// Serialize a dataset to N-Quads
pub fn serialize_nquads(dataset: &Dataset) -> SerializeResult<String> {
    let mut output = Vec::new();
    let mut formatter = NQuadsFormatter::new(&mut output);

    for graph in dataset.graphs() {
        let graph_name = graph
            .name()
            .map(|n| rio_api::model::GraphName::NamedNode(rio_api::model::NamedNode { iri: n.as_str() }));
        for triple in graph.triples() {
            let t = rio_triple(triple);
            formatter.format(&rio_api::model::Quad {
                subject: t.subject,
                predicate: t.predicate,
                object: t.object,
                graph_name,
            })?;
        }
    }
    formatter.finish()?;

    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}

pub(super) fn rio_triple(triple: &Triple) -> rio_api::model::Triple<'_> {
    rio_api::model::Triple {
        subject: rio_subject(&triple.subject),
        predicate: rio_api::model::NamedNode {
            iri: triple.predicate.as_named_node().as_str(),
        },
        object: rio_object(&triple.object),
    }
}

fn rio_subject(subject: &RdfSubject) -> rio_api::model::Subject<'_> {
    match subject {
        RdfSubject::NamedNode(n) => {
            rio_api::model::Subject::NamedNode(rio_api::model::NamedNode { iri: n.as_str() })
        }
        RdfSubject::BlankNode(b) => {
            rio_api::model::Subject::BlankNode(rio_api::model::BlankNode { id: b.as_str() })
        }
    }
}

fn rio_object(object: &RdfObject) -> rio_api::model::Term<'_> {
    match object {
        RdfObject::NamedNode(n) => {
            rio_api::model::Term::NamedNode(rio_api::model::NamedNode { iri: n.as_str() })
        }
        RdfObject::BlankNode(b) => {
            rio_api::model::Term::BlankNode(rio_api::model::BlankNode { id: b.as_str() })
        }
        RdfObject::Literal(l) => {
            let literal = l.inner();
            if let Some(language) = literal.language() {
                rio_api::model::Term::Literal(rio_api::model::Literal::LanguageTaggedString {
                    value: literal.value(),
                    language,
                })
            } else {
                let datatype = literal.datatype().as_str();
                if datatype == XSD_STRING {
                    rio_api::model::Term::Literal(rio_api::model::Literal::Simple {
                        value: literal.value(),
                    })
                } else {
                    rio_api::model::Term::Literal(rio_api::model::Literal::Typed {
                        value: literal.value(),
                        datatype: rio_api::model::NamedNode { iri: datatype },
                    })
                }
            }
        }
    }
}

pub(super) fn convert_triple(t: rio_api::model::Triple<'_>) -> ParseResult<Triple> {
    Ok(Triple::new(
        convert_subject(t.subject)?,
        convert_predicate(t.predicate)?,
        convert_object(t.object)?,
    ))
}

fn convert_quad(q: rio_api::model::Quad<'_>) -> ParseResult<Quad> {
    let graph = match q.graph_name {
        None => None,
        Some(rio_api::model::GraphName::NamedNode(n)) => {
            Some(NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))?)
        }
        Some(rio_api::model::GraphName::BlankNode(b)) => {
            return Err(ParseError::Parse(format!(
                "blank node graph names are not supported: _:{}",
                b.id
            )))
        }
    };
    Ok(Quad::new(
        convert_subject(q.subject)?,
        convert_predicate(q.predicate)?,
        convert_object(q.object)?,
        graph,
    ))
}

fn convert_subject(s: rio_api::model::Subject<'_>) -> ParseResult<RdfSubject> {
    match s {
        rio_api::model::Subject::NamedNode(n) => Ok(RdfSubject::NamedNode(
            NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        rio_api::model::Subject::BlankNode(b) => Ok(RdfSubject::BlankNode(
            BlankNode::with_id(b.id).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        #[allow(unreachable_patterns)]
        _ => Err(ParseError::Parse("Unsupported subject type".to_string())),
    }
}

fn convert_predicate(p: rio_api::model::NamedNode<'_>) -> ParseResult<RdfPredicate> {
    RdfPredicate::new(p.iri).map_err(|e| ParseError::Parse(e.to_string()))
}

fn convert_object(o: rio_api::model::Term<'_>) -> ParseResult<RdfObject> {
    match o {
        rio_api::model::Term::NamedNode(n) => Ok(RdfObject::NamedNode(
            NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        rio_api::model::Term::BlankNode(b) => Ok(RdfObject::BlankNode(
            BlankNode::with_id(b.id).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        rio_api::model::Term::Literal(l) => match l {
            rio_api::model::Literal::Simple { value } => {
                Ok(RdfObject::Literal(Literal::new_simple_literal(value)))
            }
            rio_api::model::Literal::LanguageTaggedString { value, language } => {
                Ok(RdfObject::Literal(
                    Literal::new_language_tagged_literal(value, language)
                        .map_err(|e| ParseError::Parse(e.to_string()))?,
                ))
            }
            rio_api::model::Literal::Typed { value, datatype } => {
                let dt = NamedNode::new(datatype.iri).map_err(|e| ParseError::Parse(e.to_string()))?;
                Ok(RdfObject::Literal(Literal::new_typed_literal(value, dt)))
            }
        },
        #[allow(unreachable_patterns)]
        _ => Err(ParseError::Parse("Unsupported object type".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turtle_roundtrip() {
        let input = br#"@prefix ex: <http://example.org/> .
            ex:a ex:b "c", "d"@en, 42 ."#;
        let graph = parse_turtle(input).unwrap();
        assert_eq!(graph.len(), 3);

        let output = TurtleSerializerWrapper::serialize(&graph).unwrap();
        assert!(output.contains("http://example.org/a"));
        assert_eq!(parse_turtle(output.as_bytes()).unwrap(), graph);
    }

    #[test]
    fn test_ntriples_roundtrip() {
        let input = b"<http://example.org/a> <http://example.org/b> _:x .\n";
        let graph = parse_ntriples(input).unwrap();
        let output = serialize_ntriples(&graph).unwrap();
        assert_eq!(output.trim(), "<http://example.org/a> <http://example.org/b> _:x .");
    }

    #[test]
    fn test_nquads_keeps_graphs_apart() {
        let input = b"<http://example.org/a> <http://example.org/b> \"1\" .\n\
                      <http://example.org/a> <http://example.org/b> \"2\" <http://example.org/g> .\n";
        let dataset = parse_nquads(input).unwrap();
        assert_eq!(dataset.default_graph().len(), 1);
        assert_eq!(dataset.named_graphs().count(), 1);

        let output = serialize_nquads(&dataset).unwrap();
        assert_eq!(parse_nquads(output.as_bytes()).unwrap(), dataset);
    }

    #[test]
    fn test_invalid_turtle() {
        assert!(matches!(parse_turtle(b"<a> <b"), Err(ParseError::Parse(_))));
    }
}
