//! In-memory RDF containers: descriptions, graphs and datasets
//!
//! These are plain value types. They carry the prefix map they were parsed
//! with (or built with) so that generated updates can declare it.

use super::namespace::PrefixMap;
use super::types::{NamedNode, Quad, RdfObject, RdfPredicate, RdfSubject, Triple};
use indexmap::{IndexMap, IndexSet};

/// All statements about a single subject
#[derive(Debug, Clone)]
pub struct Description {
    subject: RdfSubject,
    predications: IndexSet<(RdfPredicate, RdfObject)>,
    prefixes: PrefixMap,
}

impl Description {
    pub fn new(subject: impl Into<RdfSubject>) -> Self {
        Self {
            subject: subject.into(),
            predications: IndexSet::new(),
            prefixes: PrefixMap::new(),
        }
    }

    /// Add a predicate/object pair
    pub fn add(mut self, predicate: impl Into<RdfPredicate>, object: impl Into<RdfObject>) -> Self {
        self.predications.insert((predicate.into(), object.into()));
        self
    }

    pub fn with_prefixes(mut self, prefixes: PrefixMap) -> Self {
        self.prefixes = prefixes;
        self
    }

    pub fn subject(&self) -> &RdfSubject {
        &self.subject
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    pub fn len(&self) -> usize {
        self.predications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predications.is_empty()
    }

    pub fn triples(&self) -> impl Iterator<Item = Triple> + '_ {
        self.predications
            .iter()
            .map(|(p, o)| Triple::new(self.subject.clone(), p.clone(), o.clone()))
    }
}

impl PartialEq for Description {
    fn eq(&self, other: &Self) -> bool {
        self.subject == other.subject && self.predications == other.predications
    }
}

impl From<Description> for Graph {
    fn from(description: Description) -> Self {
        let mut graph = Graph::new().with_prefixes(description.prefixes.clone());
        graph.extend(description.triples());
        graph
    }
}

/// A set of triples, optionally named
///
/// Equality ignores triple order and prefixes.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    name: Option<NamedNode>,
    triples: IndexSet<Triple>,
    prefixes: PrefixMap,
}

impl Graph {
    /// Create an unnamed, empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with the given name
    pub fn named(name: NamedNode) -> Self {
        Self {
            name: Some(name),
            ..Self::default()
        }
    }

    pub fn with_prefixes(mut self, prefixes: PrefixMap) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Builder-style triple insertion
    pub fn with_triple(mut self, triple: Triple) -> Self {
        self.insert(triple);
        self
    }

    /// Insert a triple, returns false if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn name(&self) -> Option<&NamedNode> {
        self.name.as_ref()
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    pub fn prefixes_mut(&mut self) -> &mut PrefixMap {
        &mut self.prefixes
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Quads of this graph, in its own graph name
    pub fn quads(&self) -> impl Iterator<Item = Quad> + '_ {
        self.triples.iter().map(|t| {
            let mut quad = Quad::from_triple(t.clone());
            quad.graph = self.name.clone();
            quad
        })
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        self.triples.extend(iter);
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.triples == other.triples
    }
}

/// A default graph plus any number of named graphs
///
/// Equality ignores prefixes and empty named graphs.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    default_graph: Graph,
    named_graphs: IndexMap<NamedNode, Graph>,
    prefixes: PrefixMap,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefixes(mut self, prefixes: PrefixMap) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Builder-style graph insertion, see [`Dataset::add_graph`]
    pub fn with_graph(mut self, graph: Graph) -> Self {
        self.add_graph(graph);
        self
    }

    /// Merge a graph into the dataset: unnamed graphs go to the default graph,
    /// named ones into the named graph of the same name.
    pub fn add_graph(&mut self, graph: Graph) {
        self.prefixes.merge(&graph.prefixes);
        match graph.name.clone() {
            None => self.default_graph.extend(graph.triples),
            Some(name) => self
                .named_graphs
                .entry(name.clone())
                .or_insert_with(|| Graph::named(name))
                .extend(graph.triples),
        }
    }

    /// Insert a quad, returns false if it was already present
    pub fn insert(&mut self, quad: Quad) -> bool {
        let triple = quad.as_triple();
        match quad.graph {
            None => self.default_graph.insert(triple),
            Some(name) => self
                .named_graphs
                .entry(name.clone())
                .or_insert_with(|| Graph::named(name))
                .insert(triple),
        }
    }

    pub fn default_graph(&self) -> &Graph {
        &self.default_graph
    }

    pub fn graph(&self, name: &NamedNode) -> Option<&Graph> {
        self.named_graphs.get(name)
    }

    pub fn named_graphs(&self) -> impl Iterator<Item = &Graph> {
        self.named_graphs.values()
    }

    /// Default graph first, then the named graphs in insertion order
    pub fn graphs(&self) -> impl Iterator<Item = &Graph> {
        std::iter::once(&self.default_graph).chain(self.named_graphs.values())
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    pub fn quads(&self) -> impl Iterator<Item = Quad> + '_ {
        self.graphs().flat_map(|g| g.quads())
    }

    pub fn len(&self) -> usize {
        self.graphs().map(Graph::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs().all(Graph::is_empty)
    }
}

impl From<Graph> for Dataset {
    fn from(graph: Graph) -> Self {
        let mut dataset = Dataset::new();
        dataset.add_graph(graph);
        dataset
    }
}

impl FromIterator<Quad> for Dataset {
    fn from_iter<T: IntoIterator<Item = Quad>>(iter: T) -> Self {
        let mut dataset = Dataset::new();
        for quad in iter {
            dataset.insert(quad);
        }
        dataset
    }
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        let non_empty = |d: &Dataset| -> IndexMap<NamedNode, IndexSet<Triple>> {
            d.named_graphs
                .iter()
                .filter(|(_, g)| !g.is_empty())
                .map(|(n, g)| (n.clone(), g.triples.clone()))
                .collect()
        };
        self.default_graph.triples == other.default_graph.triples
            && non_empty(self) == non_empty(other)
    }
}
