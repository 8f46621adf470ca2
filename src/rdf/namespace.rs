//! RDF namespace and prefix management
//!
//! This module handles namespace prefixes for compact IRI notation and the
//! `PREFIX` prologue of generated SPARQL updates.

use indexmap::IndexMap;
use std::fmt::Write as _;
use thiserror::Error;

/// Prefix errors
#[derive(Error, Debug)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

/// Namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix
    pub prefix: String,
    /// IRI
    pub iri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

/// Ordered prefix map.
///
/// Insertion order is kept so that generated prologues are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixMap {
    /// Prefix → IRI mappings
    prefixes: IndexMap<String, String>,
}

impl PrefixMap {
    /// Create an empty prefix map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a prefix map with the common RDF/RDFS/OWL prefixes
    pub fn with_common_prefixes() -> Self {
        let mut map = Self::new();

        map.add_prefix("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        map.add_prefix("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        map.add_prefix("xsd", "http://www.w3.org/2001/XMLSchema#");
        map.add_prefix("owl", "http://www.w3.org/2002/07/owl#");
        map.add_prefix("foaf", "http://xmlns.com/foaf/0.1/");
        map.add_prefix("dc", "http://purl.org/dc/elements/1.1/");
        map.add_prefix("dcterms", "http://purl.org/dc/terms/");

        map
    }

    /// Add a prefix, replacing any previous mapping for it
    pub fn add_prefix(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    /// Builder-style variant of [`PrefixMap::add_prefix`]
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.add_prefix(prefix, iri);
        self
    }

    /// Add all mappings of `other`; entries of `other` win
    pub fn merge(&mut self, other: &PrefixMap) {
        for (prefix, iri) in &other.prefixes {
            self.add_prefix(prefix.clone(), iri.clone());
        }
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    /// Expand a compact IRI (prefix:local) to full IRI
    pub fn expand(&self, compact_iri: &str) -> PrefixResult<String> {
        match compact_iri.split_once(':') {
            Some((prefix, local)) => {
                let iri = self.get_iri(prefix)?;
                Ok(format!("{}{}", iri, local))
            }
            None => Err(PrefixError::InvalidIri(compact_iri.to_string())),
        }
    }

    /// Compact an IRI using the longest matching namespace
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, namespace_iri)| iri.starts_with(namespace_iri.as_str()))
            .max_by_key(|(_, namespace_iri)| namespace_iri.len())
            .map(|(prefix, namespace_iri)| format!("{}:{}", prefix, &iri[namespace_iri.len()..]))
    }

    /// Get all registered prefixes
    pub fn prefixes(&self) -> Vec<Namespace> {
        self.prefixes
            .iter()
            .map(|(prefix, iri)| Namespace::new(prefix.clone(), iri.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Render the mappings as SPARQL `PREFIX` declarations, one per line
    pub fn to_sparql_prologue(&self) -> String {
        let mut prologue = String::new();
        for (prefix, iri) in &self.prefixes {
            let _ = writeln!(prologue, "PREFIX {}: <{}>", prefix, iri);
        }
        prologue
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PrefixMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = PrefixMap::new();
        for (prefix, iri) in iter {
            map.add_prefix(prefix, iri);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefixes() {
        let map = PrefixMap::with_common_prefixes();

        assert_eq!(
            map.get_iri("rdf").unwrap(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#"
        );
        assert_eq!(
            map.get_iri("rdfs").unwrap(),
            "http://www.w3.org/2000/01/rdf-schema#"
        );
        assert_eq!(map.get_iri("xsd").unwrap(), "http://www.w3.org/2001/XMLSchema#");
    }

    #[test]
    fn test_expand() {
        let map = PrefixMap::with_common_prefixes();

        let expanded = map.expand("foaf:name").unwrap();
        assert_eq!(expanded, "http://xmlns.com/foaf/0.1/name");

        assert!(matches!(map.expand("nope:x"), Err(PrefixError::UnknownPrefix(_))));
        assert!(matches!(map.expand("plain"), Err(PrefixError::InvalidIri(_))));
    }

    #[test]
    fn test_compact_prefers_longest_namespace() {
        let map = PrefixMap::new()
            .with_prefix("ex", "http://example.org/")
            .with_prefix("people", "http://example.org/people/");

        assert_eq!(
            map.compact("http://example.org/people/alice"),
            Some("people:alice".to_string())
        );
        assert_eq!(map.compact("http://example.org/x"), Some("ex:x".to_string()));
        assert_eq!(map.compact("urn:x"), None);
    }

    #[test]
    fn test_prologue_keeps_insertion_order() {
        let map: PrefixMap = [("ex", "http://example.org/"), ("foaf", "http://xmlns.com/foaf/0.1/")]
            .into_iter()
            .collect();

        assert_eq!(
            map.to_sparql_prologue(),
            "PREFIX ex: <http://example.org/>\nPREFIX foaf: <http://xmlns.com/foaf/0.1/>\n"
        );
    }

    #[test]
    fn test_merge_overrides() {
        let mut map = PrefixMap::new().with_prefix("ex", "http://example.org/");
        map.merge(&PrefixMap::new().with_prefix("ex", "http://example.com/"));
        assert_eq!(map.get_iri("ex").unwrap(), "http://example.com/");
        assert_eq!(map.len(), 1);
    }
}
