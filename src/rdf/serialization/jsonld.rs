//! JSON-LD format implementation (Basic)
//!
//! Reads and writes expanded / flattened documents. Contexts are not
//! processed: property keys must be absolute IRIs.

use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use crate::rdf::{
    BlankNode, Dataset, Graph, Literal, NamedNode, Quad, RdfObject, RdfPredicate, RdfSubject,
};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

/// JSON-LD parser
pub struct JsonLdParserWrapper;

impl JsonLdParserWrapper {
    /// Parse a JSON-LD document to a dataset
    pub fn parse(input: &[u8]) -> ParseResult<Dataset> {
        let document: Value =
            serde_json::from_slice(input).map_err(|e| ParseError::Parse(e.to_string()))?;
        let mut reader = NodeReader::default();

        match document {
            Value::Array(nodes) => {
                for node in &nodes {
                    reader.read_top_level(node)?;
                }
            }
            Value::Object(_) => reader.read_top_level(&document)?,
            other => {
                return Err(ParseError::Parse(format!(
                    "JSON-LD document must be an object or array, got {other}"
                )))
            }
        }

        Ok(reader.dataset)
    }
}

#[derive(Default)]
struct NodeReader {
    dataset: Dataset,
    blank_nodes: IndexMap<String, BlankNode>,
}

impl NodeReader {
    fn read_top_level(&mut self, node: &Value) -> ParseResult<()> {
        let object = as_object(node)?;
        if object.contains_key("@context") {
            return Err(ParseError::Parse(
                "JSON-LD context processing is not supported".to_string(),
            ));
        }

        match object.get("@graph") {
            Some(graph) => {
                let graph_name = match object.get("@id") {
                    Some(id) => Some(self.named_node(as_str(id)?)?),
                    None => None,
                };
                for node in as_array(graph) {
                    self.read_node(node, graph_name.as_ref())?;
                }
                Ok(())
            }
            None => self.read_node(node, None).map(|_| ()),
        }
    }

    fn read_node(&mut self, node: &Value, graph: Option<&NamedNode>) -> ParseResult<RdfSubject> {
        let object = as_object(node)?;
        let subject = match object.get("@id") {
            Some(id) => self.subject(as_str(id)?)?,
            None => RdfSubject::BlankNode(BlankNode::new()),
        };

        for (key, values) in object {
            match key.as_str() {
                "@id" => {}
                "@type" => {
                    let predicate = RdfPredicate::new(RDF_TYPE).map_err(parse_error)?;
                    for value in as_array(values) {
                        let class = self.named_node(as_str(value)?)?;
                        self.push(&subject, &predicate, class.into(), graph);
                    }
                }
                k if k.starts_with('@') => {}
                iri => {
                    let predicate = RdfPredicate::new(iri).map_err(|_| {
                        ParseError::Parse(format!(
                            "property '{iri}' is not an absolute IRI, JSON-LD contexts are not supported"
                        ))
                    })?;
                    for value in as_array(values) {
                        let object = self.object(value, graph)?;
                        self.push(&subject, &predicate, object, graph);
                    }
                }
            }
        }

        Ok(subject)
    }

    fn object(&mut self, value: &Value, graph: Option<&NamedNode>) -> ParseResult<RdfObject> {
        match value {
            Value::String(s) => Ok(Literal::new_simple_literal(s.clone()).into()),
            Value::Bool(b) => Ok(typed(b.to_string(), XSD_BOOLEAN)?.into()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(typed(n.to_string(), XSD_INTEGER)?.into()),
            Value::Number(n) => Ok(typed(n.to_string(), XSD_DOUBLE)?.into()),
            Value::Object(map) if map.contains_key("@value") => {
                let lexical = match &map["@value"] {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if let Some(language) = map.get("@language") {
                    return Literal::new_language_tagged_literal(lexical, as_str(language)?)
                        .map(RdfObject::from)
                        .map_err(parse_error);
                }
                match map.get("@type") {
                    Some(datatype) => Ok(typed(lexical, as_str(datatype)?)?.into()),
                    None => Ok(Literal::new_simple_literal(lexical).into()),
                }
            }
            Value::Object(map) if map.len() == 1 && map.contains_key("@id") => {
                Ok(match self.subject(as_str(&map["@id"])?)? {
                    RdfSubject::NamedNode(n) => n.into(),
                    RdfSubject::BlankNode(b) => b.into(),
                })
            }
            Value::Object(_) => Ok(match self.read_node(value, graph)? {
                RdfSubject::NamedNode(n) => n.into(),
                RdfSubject::BlankNode(b) => b.into(),
            }),
            other => Err(ParseError::Parse(format!("unsupported JSON-LD value: {other}"))),
        }
    }

    fn push(
        &mut self,
        subject: &RdfSubject,
        predicate: &RdfPredicate,
        object: RdfObject,
        graph: Option<&NamedNode>,
    ) {
        self.dataset.insert(Quad::new(
            subject.clone(),
            predicate.clone(),
            object,
            graph.cloned(),
        ));
    }

    fn subject(&mut self, id: &str) -> ParseResult<RdfSubject> {
        match id.strip_prefix("_:") {
            Some(label) => {
                if let Some(node) = self.blank_nodes.get(label) {
                    return Ok(node.clone().into());
                }
                let node = BlankNode::with_id(label).map_err(parse_error)?;
                self.blank_nodes.insert(label.to_string(), node.clone());
                Ok(node.into())
            }
            None => Ok(self.named_node(id)?.into()),
        }
    }

    fn named_node(&self, iri: &str) -> ParseResult<NamedNode> {
        NamedNode::new(iri).map_err(parse_error)
    }
}

fn typed(lexical: String, datatype: &str) -> ParseResult<Literal> {
    let datatype = NamedNode::new(datatype).map_err(parse_error)?;
    if datatype.as_str() == XSD_STRING {
        return Ok(Literal::new_simple_literal(lexical));
    }
    Ok(Literal::new_typed_literal(lexical, datatype))
}

fn parse_error(e: impl std::fmt::Display) -> ParseError {
    ParseError::Parse(e.to_string())
}

fn as_object(value: &Value) -> ParseResult<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ParseError::Parse(format!("expected a JSON-LD node object, got {value}")))
}

fn as_str(value: &Value) -> ParseResult<&str> {
    value
        .as_str()
        .ok_or_else(|| ParseError::Parse(format!("expected a string, got {value}")))
}

fn as_array(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(values) => values.iter().collect(),
        other => vec![other],
    }
}

/// JSON-LD serializer
pub struct JsonLdSerializerWrapper;

impl JsonLdSerializerWrapper {
    /// Serialize a dataset to a JSON-LD string
    ///
    /// This implements a basic "expanded" JSON-LD serialization; named graphs
    /// become `@graph` objects.
    pub fn serialize(dataset: &Dataset) -> SerializeResult<String> {
        let mut output = node_objects(dataset.default_graph());
        for graph in dataset.named_graphs() {
            if let Some(name) = graph.name() {
                output.push(json!({
                    "@id": name.as_str(),
                    "@graph": node_objects(graph),
                }));
            }
        }

        serde_json::to_string_pretty(&output).map_err(|e| SerializeError::Serialize(e.to_string()))
    }
}

fn node_objects(graph: &Graph) -> Vec<Value> {
    // Group by subject
    let mut map: IndexMap<String, IndexMap<String, Vec<Value>>> = IndexMap::new();

    for triple in graph.triples() {
        let s_key = match &triple.subject {
            RdfSubject::NamedNode(n) => n.as_str().to_string(),
            RdfSubject::BlankNode(b) => format!("_:{}", b.as_str()),
        };
        let p_key = triple.predicate.as_named_node().as_str().to_string();

        let o_val = match &triple.object {
            RdfObject::NamedNode(n) => json!({ "@id": n.as_str() }),
            RdfObject::BlankNode(b) => json!({ "@id": format!("_:{}", b.as_str()) }),
            RdfObject::Literal(l) => {
                if let Some(lang) = l.language() {
                    json!({ "@value": l.value(), "@language": lang })
                } else if l.is_plain() {
                    json!({ "@value": l.value() })
                } else {
                    json!({ "@value": l.value(), "@type": l.datatype().as_str() })
                }
            }
        };

        map.entry(s_key)
            .or_default()
            .entry(p_key)
            .or_default()
            .push(o_val);
    }

    map.into_iter()
        .map(|(subject, props)| {
            let mut node = Map::new();
            node.insert("@id".to_string(), Value::String(subject));
            for (pred, objs) in props {
                node.insert(pred, Value::Array(objs));
            }
            Value::Object(node)
        })
        .collect()
}
