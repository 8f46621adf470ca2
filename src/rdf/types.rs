//! RDF type definitions
//!
//! This module provides wrapper types around the oxrdf library for RDF primitives.

use oxiri::Iri;
use oxrdf::{
    BlankNode as OxBlankNode, GraphName as OxGraphName, Literal as OxLiteral,
    NamedNode as OxNamedNode, NamedNodeRef as OxNamedNodeRef, Quad as OxQuad,
    Subject as OxSubject, Term as OxTerm, Triple as OxTriple,
};
use std::fmt;
use thiserror::Error;

/// RDF errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RdfError {
    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Invalid blank node
    #[error("Invalid blank node: {0}")]
    InvalidBlankNode(String),

    /// Invalid literal
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    /// Term kind that is not allowed at this position
    #[error("Unsupported term: {0}")]
    UnsupportedTerm(String),
}

pub type RdfResult<T> = Result<T, RdfError>;

/// Named node (IRI)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedNode(OxNamedNode);

impl NamedNode {
    /// Create a new named node from an absolute IRI string
    pub fn new(iri: &str) -> RdfResult<Self> {
        OxNamedNode::new(iri)
            .map(Self)
            .map_err(|e| RdfError::InvalidIri(format!("{iri}: {e}")))
    }

    /// Get the IRI string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner oxrdf NamedNode
    pub fn inner(&self) -> &OxNamedNode {
        &self.0
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.as_str())
    }
}

impl From<OxNamedNode> for NamedNode {
    fn from(node: OxNamedNode) -> Self {
        Self(node)
    }
}

impl From<NamedNode> for OxNamedNode {
    fn from(node: NamedNode) -> Self {
        node.0
    }
}

/// Anything that can be rendered as an absolute IRI.
///
/// Raw strings are validated, parsed IRIs and vocabulary terms
/// (e.g. `oxrdf::vocab::rdf::TYPE`) are taken as they are.
pub trait IntoIri {
    fn into_iri(self) -> RdfResult<NamedNode>;
}

impl IntoIri for NamedNode {
    fn into_iri(self) -> RdfResult<NamedNode> {
        Ok(self)
    }
}

impl IntoIri for &NamedNode {
    fn into_iri(self) -> RdfResult<NamedNode> {
        Ok(self.clone())
    }
}

impl IntoIri for &str {
    fn into_iri(self) -> RdfResult<NamedNode> {
        NamedNode::new(self)
    }
}

impl IntoIri for String {
    fn into_iri(self) -> RdfResult<NamedNode> {
        NamedNode::new(&self)
    }
}

impl IntoIri for &String {
    fn into_iri(self) -> RdfResult<NamedNode> {
        NamedNode::new(self)
    }
}

impl IntoIri for OxNamedNode {
    fn into_iri(self) -> RdfResult<NamedNode> {
        Ok(NamedNode(self))
    }
}

impl IntoIri for OxNamedNodeRef<'_> {
    fn into_iri(self) -> RdfResult<NamedNode> {
        Ok(NamedNode(self.into_owned()))
    }
}

impl IntoIri for Iri<String> {
    fn into_iri(self) -> RdfResult<NamedNode> {
        Ok(NamedNode(OxNamedNode::new_unchecked(self.into_inner())))
    }
}

impl IntoIri for &Iri<String> {
    fn into_iri(self) -> RdfResult<NamedNode> {
        Ok(NamedNode(OxNamedNode::new_unchecked(self.as_str())))
    }
}

/// Blank node (anonymous node)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(OxBlankNode);

impl BlankNode {
    /// Create a new blank node with a unique identifier
    pub fn new() -> Self {
        Self(OxBlankNode::default())
    }

    /// Create a blank node from an identifier
    pub fn with_id(id: &str) -> RdfResult<Self> {
        OxBlankNode::new(id)
            .map(Self)
            .map_err(|e| RdfError::InvalidBlankNode(format!("{id}: {e}")))
    }

    /// Get the blank node identifier
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner oxrdf BlankNode
    pub fn inner(&self) -> &OxBlankNode {
        &self.0
    }
}

impl Default for BlankNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.as_str())
    }
}

impl From<OxBlankNode> for BlankNode {
    fn from(node: OxBlankNode) -> Self {
        Self(node)
    }
}

impl From<BlankNode> for OxBlankNode {
    fn from(node: BlankNode) -> Self {
        node.0
    }
}

/// RDF literal value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(OxLiteral);

impl Literal {
    /// Create a simple literal (plain string)
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(OxLiteral::new_simple_literal(value))
    }

    /// Create a literal with language tag
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> RdfResult<Self> {
        OxLiteral::new_language_tagged_literal(value, language)
            .map(Self)
            .map_err(|e| RdfError::InvalidLiteral(e.to_string()))
    }

    /// Create a typed literal
    pub fn new_typed_literal(value: impl Into<String>, datatype: NamedNode) -> Self {
        Self(OxLiteral::new_typed_literal(value, datatype.0))
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        self.0.value()
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }

    /// Get the datatype
    pub fn datatype(&self) -> NamedNode {
        NamedNode(self.0.datatype().into_owned())
    }

    /// Whether this is an `xsd:string` literal without language tag
    pub fn is_plain(&self) -> bool {
        self.0.is_plain() && self.0.language().is_none()
    }

    /// Get the inner oxrdf Literal
    pub fn inner(&self) -> &OxLiteral {
        &self.0
    }
}

impl fmt::Display for Literal {
    // oxrdf takes care of escaping quotes and control characters.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<OxLiteral> for Literal {
    fn from(lit: OxLiteral) -> Self {
        Self(lit)
    }
}

impl From<Literal> for OxLiteral {
    fn from(lit: Literal) -> Self {
        lit.0
    }
}

/// Term allowed in subject position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfSubject {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
}

impl fmt::Display for RdfSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfSubject::NamedNode(n) => write!(f, "{}", n),
            RdfSubject::BlankNode(b) => write!(f, "{}", b),
        }
    }
}

impl From<NamedNode> for RdfSubject {
    fn from(node: NamedNode) -> Self {
        RdfSubject::NamedNode(node)
    }
}

impl From<BlankNode> for RdfSubject {
    fn from(node: BlankNode) -> Self {
        RdfSubject::BlankNode(node)
    }
}

impl TryFrom<OxSubject> for RdfSubject {
    type Error = RdfError;

    fn try_from(subject: OxSubject) -> RdfResult<Self> {
        match subject {
            OxSubject::NamedNode(n) => Ok(RdfSubject::NamedNode(n.into())),
            OxSubject::BlankNode(b) => Ok(RdfSubject::BlankNode(b.into())),
            #[allow(unreachable_patterns)]
            other => Err(RdfError::UnsupportedTerm(format!(
                "quoted triple as subject: {other}"
            ))),
        }
    }
}

impl From<RdfSubject> for OxSubject {
    fn from(subject: RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(n) => OxSubject::NamedNode(n.0),
            RdfSubject::BlankNode(b) => OxSubject::BlankNode(b.0),
        }
    }
}

/// RDF predicate (always a NamedNode)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RdfPredicate(NamedNode);

impl RdfPredicate {
    /// Create a new predicate from an IRI
    pub fn new(iri: &str) -> RdfResult<Self> {
        Ok(Self(NamedNode::new(iri)?))
    }

    /// Get the underlying named node
    pub fn as_named_node(&self) -> &NamedNode {
        &self.0
    }
}

impl fmt::Display for RdfPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for RdfPredicate {
    fn from(node: NamedNode) -> Self {
        RdfPredicate(node)
    }
}

impl From<RdfPredicate> for NamedNode {
    fn from(pred: RdfPredicate) -> Self {
        pred.0
    }
}

/// Term allowed in object position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfObject {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl fmt::Display for RdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfObject::NamedNode(n) => write!(f, "{}", n),
            RdfObject::BlankNode(b) => write!(f, "{}", b),
            RdfObject::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<NamedNode> for RdfObject {
    fn from(node: NamedNode) -> Self {
        RdfObject::NamedNode(node)
    }
}

impl From<BlankNode> for RdfObject {
    fn from(node: BlankNode) -> Self {
        RdfObject::BlankNode(node)
    }
}

impl From<Literal> for RdfObject {
    fn from(lit: Literal) -> Self {
        RdfObject::Literal(lit)
    }
}

impl From<RdfObject> for OxTerm {
    fn from(object: RdfObject) -> Self {
        match object {
            RdfObject::NamedNode(n) => OxTerm::NamedNode(n.0),
            RdfObject::BlankNode(b) => OxTerm::BlankNode(b.0),
            RdfObject::Literal(l) => OxTerm::Literal(l.0),
        }
    }
}

/// Any term, as bound in a query solution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfTerm {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl RdfTerm {
    /// Lexical form: the IRI, the blank node id or the literal value
    pub fn value(&self) -> &str {
        match self {
            RdfTerm::NamedNode(n) => n.as_str(),
            RdfTerm::BlankNode(b) => b.as_str(),
            RdfTerm::Literal(l) => l.value(),
        }
    }
}

impl fmt::Display for RdfTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfTerm::NamedNode(n) => write!(f, "{}", n),
            RdfTerm::BlankNode(b) => write!(f, "{}", b),
            RdfTerm::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<NamedNode> for RdfTerm {
    fn from(node: NamedNode) -> Self {
        RdfTerm::NamedNode(node)
    }
}

impl From<Literal> for RdfTerm {
    fn from(lit: Literal) -> Self {
        RdfTerm::Literal(lit)
    }
}

impl From<RdfSubject> for RdfTerm {
    fn from(subject: RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(n) => RdfTerm::NamedNode(n),
            RdfSubject::BlankNode(b) => RdfTerm::BlankNode(b),
        }
    }
}

impl From<RdfObject> for RdfTerm {
    fn from(object: RdfObject) -> Self {
        match object {
            RdfObject::NamedNode(n) => RdfTerm::NamedNode(n),
            RdfObject::BlankNode(b) => RdfTerm::BlankNode(b),
            RdfObject::Literal(l) => RdfTerm::Literal(l),
        }
    }
}

impl From<RdfTerm> for OxTerm {
    fn from(term: RdfTerm) -> Self {
        match term {
            RdfTerm::NamedNode(n) => OxTerm::NamedNode(n.0),
            RdfTerm::BlankNode(b) => OxTerm::BlankNode(b.0),
            RdfTerm::Literal(l) => OxTerm::Literal(l.0),
        }
    }
}

impl TryFrom<OxTerm> for RdfTerm {
    type Error = RdfError;

    fn try_from(term: OxTerm) -> RdfResult<Self> {
        match term {
            OxTerm::NamedNode(n) => Ok(RdfTerm::NamedNode(n.into())),
            OxTerm::BlankNode(b) => Ok(RdfTerm::BlankNode(b.into())),
            OxTerm::Literal(l) => Ok(RdfTerm::Literal(l.into())),
            #[allow(unreachable_patterns)]
            other => Err(RdfError::UnsupportedTerm(format!("quoted triple: {other}"))),
        }
    }
}

impl TryFrom<OxTerm> for RdfObject {
    type Error = RdfError;

    fn try_from(term: OxTerm) -> RdfResult<Self> {
        Ok(match RdfTerm::try_from(term)? {
            RdfTerm::NamedNode(n) => RdfObject::NamedNode(n),
            RdfTerm::BlankNode(b) => RdfObject::BlankNode(b),
            RdfTerm::Literal(l) => RdfObject::Literal(l),
        })
    }
}

/// Triple of the default graph or of a `Graph`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: RdfSubject,
    pub predicate: RdfPredicate,
    pub object: RdfObject,
}

impl Triple {
    pub fn new(subject: RdfSubject, predicate: RdfPredicate, object: RdfObject) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Convert to oxrdf Triple
    pub fn to_oxrdf(&self) -> OxTriple {
        let subject: OxSubject = self.subject.clone().into();
        let predicate: OxNamedNode = self.predicate.clone().0.into();
        let object: OxTerm = self.object.clone().into();

        OxTriple::new(subject, predicate, object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

impl TryFrom<OxTriple> for Triple {
    type Error = RdfError;

    fn try_from(triple: OxTriple) -> RdfResult<Self> {
        Ok(Self {
            subject: triple.subject.try_into()?,
            predicate: RdfPredicate(triple.predicate.into()),
            object: triple.object.try_into()?,
        })
    }
}

/// Triple with the graph it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    pub subject: RdfSubject,
    pub predicate: RdfPredicate,
    pub object: RdfObject,
    /// `None` for the default graph
    pub graph: Option<NamedNode>,
}

impl Quad {
    pub fn new(
        subject: RdfSubject,
        predicate: RdfPredicate,
        object: RdfObject,
        graph: Option<NamedNode>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// Create a quad from a triple (default graph)
    pub fn from_triple(triple: Triple) -> Self {
        Self {
            subject: triple.subject,
            predicate: triple.predicate,
            object: triple.object,
            graph: None,
        }
    }

    /// Get the triple part (without graph)
    pub fn as_triple(&self) -> Triple {
        Triple {
            subject: self.subject.clone(),
            predicate: self.predicate.clone(),
            object: self.object.clone(),
        }
    }

    /// Convert to oxrdf Quad
    pub fn to_oxrdf(&self) -> OxQuad {
        let graph_name = match &self.graph {
            Some(g) => OxGraphName::NamedNode(g.0.clone()),
            None => OxGraphName::DefaultGraph,
        };
        OxQuad::new(
            OxSubject::from(self.subject.clone()),
            OxNamedNode::from(self.predicate.as_named_node().clone()),
            OxTerm::from(self.object.clone()),
            graph_name,
        )
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(graph) = &self.graph {
            write!(
                f,
                "{} {} {} {} .",
                self.subject, self.predicate, self.object, graph
            )
        } else {
            write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_node() {
        let node = NamedNode::new("http://example.org/alice").unwrap();
        assert_eq!(node.as_str(), "http://example.org/alice");
        assert_eq!(node.to_string(), "<http://example.org/alice>");
    }

    #[test]
    fn test_relative_iri_rejected() {
        assert!(matches!(
            NamedNode::new("alice"),
            Err(RdfError::InvalidIri(_))
        ));
    }

    #[test]
    fn test_into_iri_sources() {
        let expected = NamedNode::new("http://www.w3.org/1999/02/22-rdf-syntax-ns#type").unwrap();

        assert_eq!(
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type".into_iri().unwrap(),
            expected
        );
        assert_eq!(oxrdf::vocab::rdf::TYPE.into_iri().unwrap(), expected);
        let parsed = Iri::parse("http://www.w3.org/1999/02/22-rdf-syntax-ns#type".to_string()).unwrap();
        assert_eq!(parsed.into_iri().unwrap(), expected);
        assert_eq!((&expected).into_iri().unwrap(), expected);
    }

    #[test]
    fn test_blank_node() {
        let node1 = BlankNode::new();
        let node2 = BlankNode::new();
        assert_ne!(node1, node2); // Should have unique identifiers

        let named = BlankNode::with_id("b0").unwrap();
        assert_eq!(named.to_string(), "_:b0");
    }

    #[test]
    fn test_literal() {
        // Simple literal
        let lit = Literal::new_simple_literal("Alice");
        assert_eq!(lit.value(), "Alice");
        assert!(lit.is_plain());

        // Language-tagged literal
        let lit = Literal::new_language_tagged_literal("Alice", "en").unwrap();
        assert_eq!(lit.value(), "Alice");
        assert_eq!(lit.language(), Some("en"));
        assert!(!lit.is_plain());
    }

    #[test]
    fn test_literal_display_escapes_quotes() {
        let lit = Literal::new_simple_literal("say \"hi\"");
        assert_eq!(lit.to_string(), r#""say \"hi\"""#);
    }

    #[test]
    fn test_triple() {
        let subject = NamedNode::new("http://example.org/alice").unwrap();
        let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
        let object = Literal::new_simple_literal("Alice");

        let triple = Triple::new(subject.into(), predicate, object.into());

        assert!(matches!(triple.subject, RdfSubject::NamedNode(_)));
        assert!(matches!(triple.object, RdfObject::Literal(_)));
        assert_eq!(
            triple.to_string(),
            r#"<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> "Alice" ."#
        );
    }

    #[test]
    fn test_oxrdf_roundtrip() {
        let triple = Triple::new(
            NamedNode::new("http://example.org/s").unwrap().into(),
            RdfPredicate::new("http://example.org/p").unwrap(),
            BlankNode::with_id("o").unwrap().into(),
        );
        assert_eq!(Triple::try_from(triple.to_oxrdf()).unwrap(), triple);
    }

    #[test]
    fn test_quad() {
        let subject = NamedNode::new("http://example.org/alice").unwrap();
        let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
        let object = Literal::new_simple_literal("Alice");
        let graph = NamedNode::new("http://example.org/graph/social").unwrap();

        let quad = Quad::new(subject.into(), predicate, object.into(), Some(graph));

        assert!(quad.graph.is_some());

        let triple = quad.as_triple();
        assert!(matches!(triple.subject, RdfSubject::NamedNode(_)));
    }
}
