//! SPARQL query results
//!
//! Decoding of response bodies into typed results, and re-serialization of
//! those results (used by the command line tool for output).

use super::{QueryForm, ResultFormat};
use crate::error::{SparqlClientError, SparqlClientResult};
use crate::rdf::{
    BlankNode, Dataset, Graph, Literal, NamedNode, RdfFormat, RdfParser, RdfTerm, SerializeError,
};
use indexmap::IndexMap;
use oxrdf::{Term as OxTerm, Variable};
use sparesults::{
    QueryResultsFormat, QueryResultsParser, QueryResultsSerializer, SliceQueryResultsParserOutput,
};

/// Query solution (variable bindings)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySolution {
    /// Variable name → RDF term bindings
    bindings: IndexMap<String, RdfTerm>,
}

impl QuerySolution {
    /// Create a new query solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a binding
    pub fn get(&self, variable: &str) -> Option<&RdfTerm> {
        self.bindings.get(variable)
    }

    /// Add a binding
    pub fn bind(&mut self, variable: impl Into<String>, term: RdfTerm) {
        self.bindings.insert(variable.into(), term);
    }

    /// Builder-style binding
    pub fn with(mut self, variable: impl Into<String>, term: impl Into<RdfTerm>) -> Self {
        self.bind(variable, term.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RdfTerm)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Variables and solutions of a SELECT query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solutions {
    pub variables: Vec<String>,
    pub solutions: Vec<QuerySolution>,
}

impl Solutions {
    pub fn new(variables: Vec<String>) -> Self {
        Self {
            variables,
            solutions: Vec::new(),
        }
    }

    pub fn push(&mut self, solution: QuerySolution) {
        self.solutions.push(solution);
    }

    pub fn with_solution(mut self, solution: QuerySolution) -> Self {
        self.push(solution);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuerySolution> {
        self.solutions.iter()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}

impl IntoIterator for Solutions {
    type Item = QuerySolution;
    type IntoIter = std::vec::IntoIter<QuerySolution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}

/// SPARQL query results
#[derive(Debug, Clone, PartialEq)]
pub enum SparqlResults {
    /// Bindings from SELECT query
    Bindings(Solutions),

    /// Boolean result from ASK query
    Boolean(bool),

    /// Graph from CONSTRUCT/DESCRIBE query
    Graph(Graph),

    /// Quads from CONSTRUCT/DESCRIBE query answered in a dataset format
    Dataset(Dataset),
}

impl SparqlResults {
    /// A query form producing this kind of result; graph results report
    /// `Construct` since they can't tell it from `Describe`
    pub fn form(&self) -> QueryForm {
        match self {
            SparqlResults::Bindings(_) => QueryForm::Select,
            SparqlResults::Boolean(_) => QueryForm::Ask,
            SparqlResults::Graph(_) | SparqlResults::Dataset(_) => QueryForm::Construct,
        }
    }

    /// Shape of the result, as named in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            SparqlResults::Bindings(_) => "solution sequence",
            SparqlResults::Boolean(_) => "boolean",
            SparqlResults::Graph(_) | SparqlResults::Dataset(_) => "graph",
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            SparqlResults::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn into_solutions(self) -> Option<Solutions> {
        match self {
            SparqlResults::Bindings(solutions) => Some(solutions),
            _ => None,
        }
    }

    /// Graph results as a dataset; triple results land in the default graph
    pub fn into_dataset(self) -> Option<Dataset> {
        match self {
            SparqlResults::Graph(graph) => Some(Dataset::from(graph)),
            SparqlResults::Dataset(dataset) => Some(dataset),
            _ => None,
        }
    }

    /// Serialize results to string
    pub fn serialize(&self, format: ResultFormat) -> SparqlClientResult<String> {
        format.validate_for(self.form())?;

        match self {
            SparqlResults::Graph(graph) => Ok(graph.serialize(rdf_format(format)?)?),
            SparqlResults::Dataset(dataset) => Ok(dataset.serialize(rdf_format(format)?)?),
            SparqlResults::Boolean(value) => {
                let output = QueryResultsSerializer::from_format(tuple_format(format)?)
                    .serialize_boolean_to_writer(Vec::new(), *value)?;
                utf8(output)
            }
            SparqlResults::Bindings(solutions) => serialize_solutions(solutions, tuple_format(format)?),
        }
    }
}

fn rdf_format(format: ResultFormat) -> SparqlClientResult<RdfFormat> {
    format
        .rdf_format()
        .ok_or_else(|| SparqlClientError::invalid_option("result_format", format.name()))
}

fn tuple_format(format: ResultFormat) -> SparqlClientResult<QueryResultsFormat> {
    format
        .results_format()
        .ok_or_else(|| SparqlClientError::invalid_option("result_format", format.name()))
}

fn utf8(output: Vec<u8>) -> SparqlClientResult<String> {
    String::from_utf8(output)
        .map_err(|e| SparqlClientError::RdfSerialize(SerializeError::Serialize(e.to_string())))
}

fn serialize_solutions(solutions: &Solutions, format: QueryResultsFormat) -> SparqlClientResult<String> {
    let variables = solutions
        .variables
        .iter()
        .map(|name| {
            Variable::new(name.as_str()).map_err(|e| {
                SparqlClientError::RdfSerialize(SerializeError::Serialize(format!("?{name}: {e}")))
            })
        })
        .collect::<SparqlClientResult<Vec<_>>>()?;

    let mut serializer = QueryResultsSerializer::from_format(format)
        .serialize_solutions_to_writer(Vec::new(), variables.clone())?;

    for solution in solutions.iter() {
        let terms: Vec<(&Variable, OxTerm)> = variables
            .iter()
            .filter_map(|v| solution.get(v.as_str()).map(|t| (v, OxTerm::from(t.clone()))))
            .collect();
        serializer.serialize(terms.iter().map(|(v, t)| (v.as_ref(), t.as_ref())))?;
    }

    utf8(serializer.finish()?)
}

/// Decode SPARQL JSON, XML or TSV results
pub(super) fn decode_tuples(
    body: &[u8],
    format: QueryResultsFormat,
) -> SparqlClientResult<SparqlResults> {
    match QueryResultsParser::from_format(format).for_slice(body)? {
        SliceQueryResultsParserOutput::Boolean(value) => Ok(SparqlResults::Boolean(value)),
        SliceQueryResultsParserOutput::Solutions(parser) => {
            let variables = parser
                .variables()
                .iter()
                .map(|v| v.as_str().to_string())
                .collect();
            let mut solutions = Solutions::new(variables);

            for solution in parser {
                let solution = solution?;
                let mut bindings = QuerySolution::new();
                for (variable, term) in solution.iter() {
                    bindings.bind(variable.as_str(), RdfTerm::try_from(term.clone())?);
                }
                solutions.push(bindings);
            }

            Ok(SparqlResults::Bindings(solutions))
        }
    }
}

/// Decode SPARQL CSV results.
///
/// CSV drops term kinds, so cells are mapped back heuristically: empty is
/// unbound, `_:` starts a blank node, an absolute IRI is a named node and
/// anything else is a plain literal.
pub(super) fn decode_csv(body: &[u8]) -> SparqlClientResult<SparqlResults> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(body);
    let variables: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut solutions = Solutions::new(variables.clone());

    for record in reader.records() {
        let record = record?;
        let mut solution = QuerySolution::new();
        for (variable, value) in variables.iter().zip(record.iter()) {
            if let Some(term) = csv_term(value)? {
                solution.bind(variable.as_str(), term);
            }
        }
        solutions.push(solution);
    }

    Ok(SparqlResults::Bindings(solutions))
}

fn csv_term(value: &str) -> SparqlClientResult<Option<RdfTerm>> {
    if value.is_empty() {
        return Ok(None);
    }
    if let Some(id) = value.strip_prefix("_:") {
        return Ok(Some(RdfTerm::BlankNode(BlankNode::with_id(id)?)));
    }
    Ok(Some(match NamedNode::new(value) {
        Ok(node) => node.into(),
        Err(_) => Literal::new_simple_literal(value).into(),
    }))
}

/// Decode a CONSTRUCT/DESCRIBE response
pub(super) fn decode_rdf(body: &[u8], format: RdfFormat) -> SparqlClientResult<SparqlResults> {
    if format.supports_datasets() {
        let dataset = RdfParser::parse_dataset(body, format)?;
        if dataset.named_graphs().any(|g| !g.is_empty()) {
            return Ok(SparqlResults::Dataset(dataset));
        }
        return Ok(SparqlResults::Graph(dataset.default_graph().clone()));
    }
    Ok(SparqlResults::Graph(RdfParser::parse_graph(body, format)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECT_JSON: &str = r#"{
        "head": {"vars": ["s", "label"]},
        "results": {"bindings": [
            {"s": {"type": "uri", "value": "http://example.org/a"},
             "label": {"type": "literal", "value": "A", "xml:lang": "en"}},
            {"s": {"type": "bnode", "value": "b0"}}
        ]}
    }"#;

    #[test]
    fn test_query_solution() {
        let mut solution = QuerySolution::new();
        assert!(solution.is_empty());

        solution.bind("x", Literal::new_simple_literal("1").into());
        assert_eq!(solution.get("x").map(RdfTerm::value), Some("1"));
        assert_eq!(solution.get("y"), None);
    }

    #[test]
    fn test_result_kind() {
        assert_eq!(SparqlResults::Boolean(true).kind(), "boolean");
        assert_eq!(SparqlResults::Graph(Graph::new()).kind(), "graph");
        assert_eq!(SparqlResults::Dataset(Dataset::new()).kind(), "graph");
    }

    #[test]
    fn test_decode_json_select() {
        let results = ResultFormat::Json.decode(SELECT_JSON.as_bytes()).unwrap();
        let solutions = results.into_solutions().unwrap();

        assert_eq!(solutions.variables, vec!["s", "label"]);
        assert_eq!(solutions.len(), 2);
        assert_eq!(
            solutions.solutions[0].get("label"),
            Some(&RdfTerm::Literal(
                Literal::new_language_tagged_literal("A", "en").unwrap()
            ))
        );
        assert!(solutions.solutions[1].get("label").is_none());
    }

    #[test]
    fn test_decode_boolean() {
        let results = ResultFormat::Json
            .decode(br#"{"head": {}, "boolean": true}"#)
            .unwrap();
        assert_eq!(results.as_boolean(), Some(true));

        let xml = br#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#"><head/><boolean>false</boolean></sparql>"#;
        assert_eq!(ResultFormat::Xml.decode(xml).unwrap().as_boolean(), Some(false));
    }

    #[test]
    fn test_reserialize_across_tuple_formats() {
        let results = ResultFormat::Json.decode(SELECT_JSON.as_bytes()).unwrap();

        for format in [ResultFormat::Json, ResultFormat::Xml, ResultFormat::Tsv] {
            let output = results.serialize(format).unwrap();
            let decoded = format.decode(output.as_bytes()).unwrap();
            assert_eq!(decoded, results, "{format}");
        }
    }

    #[test]
    fn test_decode_csv_is_lossy() {
        let body = b"s,o,n\r\nhttp://example.org/a,_:b1,hello world\r\nhttp://example.org/b,,42\r\n";
        let solutions = ResultFormat::Csv.decode(body).unwrap().into_solutions().unwrap();

        assert_eq!(solutions.variables, vec!["s", "o", "n"]);
        let first = &solutions.solutions[0];
        assert!(matches!(first.get("s"), Some(RdfTerm::NamedNode(_))));
        assert!(matches!(first.get("o"), Some(RdfTerm::BlankNode(_))));
        assert_eq!(
            first.get("n"),
            Some(&RdfTerm::Literal(Literal::new_simple_literal("hello world")))
        );
        let second = &solutions.solutions[1];
        assert!(second.get("o").is_none());
        assert_eq!(second.get("n").map(RdfTerm::value), Some("42"));
    }

    #[test]
    fn test_boolean_refuses_tuple_only_formats() {
        assert!(matches!(
            SparqlResults::Boolean(true).serialize(ResultFormat::Csv),
            Err(SparqlClientError::UnsupportedResultFormat { form: QueryForm::Ask, .. })
        ));
    }

    #[test]
    fn test_decode_graph_formats() {
        let turtle = b"<http://example.org/s> <http://example.org/p> \"o\" .";
        assert!(matches!(
            ResultFormat::Turtle.decode(turtle).unwrap(),
            SparqlResults::Graph(graph) if graph.len() == 1
        ));

        let nquads = b"<http://example.org/s> <http://example.org/p> \"o\" <http://example.org/g> .\n";
        assert!(matches!(
            ResultFormat::NQuads.decode(nquads).unwrap(),
            SparqlResults::Dataset(dataset) if dataset.len() == 1
        ));

        assert!(matches!(
            ResultFormat::Json.decode(b"{not json"),
            Err(SparqlClientError::ResultsSyntax(_))
        ));
    }
}
