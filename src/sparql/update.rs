//! SPARQL Update builder
//!
//! Generates update strings from structured arguments. Nothing here does
//! I/O; every function returns the update text or an error.

use super::UpdateForm;
use crate::error::{SparqlClientError, SparqlClientResult};
use crate::rdf::{Dataset, Description, Graph, IntoIri, NamedNode, PrefixMap, RdfFormat, RdfResult};
use std::fmt;
use std::str::FromStr;

/// RDF data of an `INSERT DATA` / `DELETE DATA` update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateData {
    Description(Description),
    Graph(Graph),
    Dataset(Dataset),
}

impl UpdateData {
    /// Prefixes registered on the data
    pub fn prefixes(&self) -> &PrefixMap {
        match self {
            UpdateData::Description(d) => d.prefixes(),
            UpdateData::Graph(g) => g.prefixes(),
            UpdateData::Dataset(d) => d.prefixes(),
        }
    }

    fn into_dataset(self) -> Dataset {
        match self {
            UpdateData::Description(d) => Dataset::from(Graph::from(d)),
            UpdateData::Graph(g) => Dataset::from(g),
            UpdateData::Dataset(d) => d,
        }
    }
}

impl From<Description> for UpdateData {
    fn from(description: Description) -> Self {
        UpdateData::Description(description)
    }
}

impl From<Graph> for UpdateData {
    fn from(graph: Graph) -> Self {
        UpdateData::Graph(graph)
    }
}

impl From<Dataset> for UpdateData {
    fn from(dataset: Dataset) -> Self {
        UpdateData::Dataset(dataset)
    }
}

/// Target of a graph management operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphSelector {
    /// `DEFAULT`
    Default,
    /// `NAMED`, all named graphs (CLEAR and DROP only)
    Named,
    /// `ALL` (CLEAR and DROP only)
    All,
    /// `GRAPH <iri>`
    Graph(NamedNode),
}

impl GraphSelector {
    /// Select a single named graph
    pub fn graph(iri: impl IntoIri) -> RdfResult<Self> {
        Ok(GraphSelector::Graph(iri.into_iri()?))
    }

    /// Whether the selector names at most one graph, as COPY/MOVE/ADD require
    fn is_single_graph(&self) -> bool {
        matches!(self, GraphSelector::Default | GraphSelector::Graph(_))
    }
}

impl fmt::Display for GraphSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphSelector::Default => f.write_str("DEFAULT"),
            GraphSelector::Named => f.write_str("NAMED"),
            GraphSelector::All => f.write_str("ALL"),
            GraphSelector::Graph(iri) => write!(f, "GRAPH {iri}"),
        }
    }
}

impl From<NamedNode> for GraphSelector {
    fn from(iri: NamedNode) -> Self {
        GraphSelector::Graph(iri)
    }
}

impl FromStr for GraphSelector {
    type Err = SparqlClientError;

    /// `default`, `named`, `all` or an absolute IRI
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(GraphSelector::Default),
            "named" => Ok(GraphSelector::Named),
            "all" => Ok(GraphSelector::All),
            _ => NamedNode::new(s.trim())
                .map(GraphSelector::Graph)
                .map_err(|_| SparqlClientError::invalid_option("graph", s)),
        }
    }
}

fn silent(silent: bool) -> &'static str {
    if silent {
        "SILENT "
    } else {
        ""
    }
}

/// Build an `INSERT DATA` or `DELETE DATA` update.
///
/// `prefixes` replaces the prefixes registered on the data. Named graphs are
/// wrapped in `GRAPH` blocks unless `merge_graphs` flattens everything into
/// the default graph.
pub fn update_data(
    form: UpdateForm,
    data: UpdateData,
    prefixes: Option<&PrefixMap>,
    merge_graphs: bool,
) -> SparqlClientResult<String> {
    if !matches!(form, UpdateForm::InsertData | UpdateForm::DeleteData) {
        return Err(SparqlClientError::invalid_option("update_form", form.name()));
    }

    let prologue = prefixes.unwrap_or(data.prefixes()).to_sparql_prologue();
    let dataset = data.into_dataset();

    let mut body = String::new();
    if merge_graphs {
        let merged: Graph = dataset.quads().map(|q| q.as_triple()).collect();
        body.push_str(&merged.serialize(RdfFormat::NTriples)?);
    } else {
        body.push_str(&dataset.default_graph().serialize(RdfFormat::NTriples)?);
        for graph in dataset.named_graphs().filter(|g| !g.is_empty()) {
            if let Some(name) = graph.name() {
                body.push_str(&format!(
                    "GRAPH {name} {{\n{}}}\n",
                    graph.serialize(RdfFormat::NTriples)?
                ));
            }
        }
    }

    Ok(format!("{prologue}{} {{\n{body}}}", form.keyword()))
}

/// `LOAD [SILENT] <from> [INTO GRAPH <to>]`
pub fn load(from: impl IntoIri, to: Option<NamedNode>, silent_flag: bool) -> RdfResult<String> {
    let from = from.into_iri()?;
    let mut update = format!("LOAD {}{from}", silent(silent_flag));
    if let Some(to) = to {
        update.push_str(&format!(" INTO GRAPH {to}"));
    }
    Ok(update)
}

/// `CLEAR [SILENT] <selector>`
pub fn clear(selector: &GraphSelector, silent_flag: bool) -> String {
    format!("CLEAR {}{selector}", silent(silent_flag))
}

/// `DROP [SILENT] <selector>`
pub fn drop(selector: &GraphSelector, silent_flag: bool) -> String {
    format!("DROP {}{selector}", silent(silent_flag))
}

/// `CREATE [SILENT] GRAPH <iri>`
pub fn create(graph: impl IntoIri, silent_flag: bool) -> RdfResult<String> {
    Ok(format!("CREATE {}GRAPH {}", silent(silent_flag), graph.into_iri()?))
}

/// `COPY`, `MOVE` or `ADD` between two single graphs
pub fn transfer(
    form: UpdateForm,
    from: &GraphSelector,
    to: &GraphSelector,
    silent_flag: bool,
) -> SparqlClientResult<String> {
    if !matches!(form, UpdateForm::Copy | UpdateForm::Move | UpdateForm::Add) {
        return Err(SparqlClientError::invalid_option("update_form", form.name()));
    }
    for selector in [from, to] {
        if !selector.is_single_graph() {
            return Err(SparqlClientError::invalid_option("graph", selector.to_string()));
        }
    }
    Ok(format!("{} {}{from} TO {to}", form.keyword(), silent(silent_flag)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{Literal, Quad, RdfPredicate, Triple};

    fn triple(s: &str) -> Triple {
        Triple::new(
            NamedNode::new(s).unwrap().into(),
            RdfPredicate::new("http://example.org/p").unwrap(),
            Literal::new_simple_literal("v").into(),
        )
    }

    fn dataset() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.insert(Quad::from_triple(triple("http://example.org/s1")));
        let mut quad = Quad::from_triple(triple("http://example.org/s2"));
        quad.graph = Some(NamedNode::new("http://example.org/g").unwrap());
        dataset.insert(quad);
        dataset
    }

    #[test]
    fn test_insert_data_wraps_named_graphs_only() {
        let update = update_data(UpdateForm::InsertData, dataset().into(), None, false).unwrap();

        assert_eq!(
            update,
            "INSERT DATA {\n\
             <http://example.org/s1> <http://example.org/p> \"v\" .\n\
             GRAPH <http://example.org/g> {\n\
             <http://example.org/s2> <http://example.org/p> \"v\" .\n\
             }\n\
             }"
        );
        assert_eq!(update.matches("GRAPH").count(), 1);
    }

    #[test]
    fn test_merge_graphs_flattens() {
        let update = update_data(UpdateForm::DeleteData, dataset().into(), None, true).unwrap();

        assert!(update.starts_with("DELETE DATA {\n"));
        assert!(!update.contains("GRAPH"));
        assert!(update.contains("<http://example.org/s1>"));
        assert!(update.contains("<http://example.org/s2>"));
    }

    #[test]
    fn test_prefix_prologue() {
        let graph = Graph::new()
            .with_triple(triple("http://example.org/s1"))
            .with_prefixes(PrefixMap::new().with_prefix("ex", "http://example.org/"));
        let update = update_data(UpdateForm::InsertData, graph.clone().into(), None, false).unwrap();
        assert!(update.starts_with("PREFIX ex: <http://example.org/>\nINSERT DATA {"));

        let explicit = PrefixMap::new().with_prefix("foaf", "http://xmlns.com/foaf/0.1/");
        let update = update_data(UpdateForm::InsertData, graph.into(), Some(&explicit), false).unwrap();
        assert!(update.starts_with("PREFIX foaf: <http://xmlns.com/foaf/0.1/>\nINSERT DATA {"));
        assert!(!update.contains("PREFIX ex:"));
    }

    #[test]
    fn test_graph_management() {
        let g = NamedNode::new("http://example.org/g").unwrap();

        assert_eq!(
            load("http://example.org/data.ttl", None, false).unwrap(),
            "LOAD <http://example.org/data.ttl>"
        );
        assert_eq!(
            load("http://example.org/data.ttl", Some(g.clone()), true).unwrap(),
            "LOAD SILENT <http://example.org/data.ttl> INTO GRAPH <http://example.org/g>"
        );
        assert!(load("data.ttl", None, false).is_err());

        assert_eq!(clear(&GraphSelector::All, false), "CLEAR ALL");
        assert_eq!(drop(&GraphSelector::Named, true), "DROP SILENT NAMED");
        assert_eq!(
            clear(&GraphSelector::Graph(g.clone()), false),
            "CLEAR GRAPH <http://example.org/g>"
        );
        assert_eq!(
            create(oxrdf::vocab::rdf::TYPE, true).unwrap(),
            "CREATE SILENT GRAPH <http://www.w3.org/1999/02/22-rdf-syntax-ns#type>"
        );
    }

    #[test]
    fn test_transfer() {
        let g = GraphSelector::graph("http://example.org/g").unwrap();

        assert_eq!(
            transfer(UpdateForm::Copy, &GraphSelector::Default, &g, false).unwrap(),
            "COPY DEFAULT TO GRAPH <http://example.org/g>"
        );
        assert_eq!(
            transfer(UpdateForm::Move, &g, &GraphSelector::Default, true).unwrap(),
            "MOVE SILENT GRAPH <http://example.org/g> TO DEFAULT"
        );
        assert!(transfer(UpdateForm::Add, &GraphSelector::All, &g, false).is_err());
        assert!(transfer(UpdateForm::Load, &g, &g, false).is_err());
    }

    #[test]
    fn test_graph_selector_from_str() {
        assert_eq!("DEFAULT".parse::<GraphSelector>().unwrap(), GraphSelector::Default);
        assert_eq!("all".parse::<GraphSelector>().unwrap(), GraphSelector::All);
        assert!(matches!(
            "http://example.org/g".parse::<GraphSelector>().unwrap(),
            GraphSelector::Graph(_)
        ));
        assert!("nope".parse::<GraphSelector>().is_err());
    }
}
