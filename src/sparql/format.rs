//! Result format registry
//!
//! Two families of formats: tuple results (SELECT/ASK) and RDF graph
//! results (CONSTRUCT/DESCRIBE). Each format knows its media type and
//! the query forms it can carry.

use super::results::{self, SparqlResults};
use super::QueryForm;
use crate::error::{SparqlClientError, SparqlClientResult};
use crate::rdf::RdfFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SPARQL result format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    /// SPARQL 1.1 Query Results JSON
    Json,
    /// SPARQL Query Results XML
    Xml,
    /// SPARQL 1.1 Query Results CSV (lossy)
    Csv,
    /// SPARQL 1.1 Query Results TSV
    Tsv,
    Turtle,
    NTriples,
    NQuads,
    RdfXml,
    JsonLd,
}

impl ResultFormat {
    pub const ALL: [ResultFormat; 9] = [
        ResultFormat::Json,
        ResultFormat::Xml,
        ResultFormat::Csv,
        ResultFormat::Tsv,
        ResultFormat::Turtle,
        ResultFormat::NTriples,
        ResultFormat::NQuads,
        ResultFormat::RdfXml,
        ResultFormat::JsonLd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResultFormat::Json => "json",
            ResultFormat::Xml => "xml",
            ResultFormat::Csv => "csv",
            ResultFormat::Tsv => "tsv",
            rdf => rdf.rdf_format().map_or("", RdfFormat::name),
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ResultFormat::Json => "application/sparql-results+json",
            ResultFormat::Xml => "application/sparql-results+xml",
            ResultFormat::Csv => "text/csv",
            ResultFormat::Tsv => "text/tab-separated-values",
            rdf => rdf.rdf_format().map_or("", RdfFormat::media_type),
        }
    }

    /// The RDF serialization behind a graph result format
    pub fn rdf_format(self) -> Option<RdfFormat> {
        match self {
            ResultFormat::Turtle => Some(RdfFormat::Turtle),
            ResultFormat::NTriples => Some(RdfFormat::NTriples),
            ResultFormat::NQuads => Some(RdfFormat::NQuads),
            ResultFormat::RdfXml => Some(RdfFormat::RdfXml),
            ResultFormat::JsonLd => Some(RdfFormat::JsonLd),
            ResultFormat::Json | ResultFormat::Xml | ResultFormat::Csv | ResultFormat::Tsv => None,
        }
    }

    pub fn is_tuple_format(self) -> bool {
        self.rdf_format().is_none()
    }

    /// Query forms this format can carry
    pub fn query_forms(self) -> &'static [QueryForm] {
        match self {
            ResultFormat::Json | ResultFormat::Xml => &[QueryForm::Select, QueryForm::Ask],
            ResultFormat::Csv | ResultFormat::Tsv => &[QueryForm::Select],
            _ => &[QueryForm::Construct, QueryForm::Describe],
        }
    }

    pub fn supports(self, form: QueryForm) -> bool {
        self.query_forms().contains(&form)
    }

    /// Check that this format may be requested for `form`
    pub fn validate_for(self, form: QueryForm) -> SparqlClientResult<Self> {
        if self.supports(form) {
            Ok(self)
        } else {
            Err(SparqlClientError::UnsupportedResultFormat {
                format: self.name().to_string(),
                form,
            })
        }
    }

    /// Find the format registered for a media type, among those valid for `form`.
    ///
    /// Parameters such as `;charset=utf-8` are ignored and the match is
    /// case-insensitive.
    pub fn from_media_type(media_type: &str, form: QueryForm) -> Option<Self> {
        let essence = media_type_essence(media_type);
        Self::ALL
            .into_iter()
            .filter(|f| f.supports(form))
            .find(|f| f.media_type() == essence)
    }

    /// The sparesults format behind a tuple result format
    pub(crate) fn results_format(self) -> Option<sparesults::QueryResultsFormat> {
        match self {
            ResultFormat::Json => Some(sparesults::QueryResultsFormat::Json),
            ResultFormat::Xml => Some(sparesults::QueryResultsFormat::Xml),
            ResultFormat::Csv => Some(sparesults::QueryResultsFormat::Csv),
            ResultFormat::Tsv => Some(sparesults::QueryResultsFormat::Tsv),
            _ => None,
        }
    }

    /// Decode a response body
    pub fn decode(self, body: &[u8]) -> SparqlClientResult<SparqlResults> {
        match (self.rdf_format(), self.results_format()) {
            (Some(format), _) => results::decode_rdf(body, format),
            // sparesults only writes CSV
            (None, Some(sparesults::QueryResultsFormat::Csv)) => results::decode_csv(body),
            (None, Some(format)) => results::decode_tuples(body, format),
            (None, None) => Err(SparqlClientError::invalid_option("result_format", self.name())),
        }
    }
}

/// Lowercased `type/subtype` of a Content-Type value, without parameters
pub(crate) fn media_type_essence(content_type: &str) -> String {
    content_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str().to_ascii_lowercase())
        .unwrap_or_else(|_| {
            let essence = content_type.split(';').next().unwrap_or_default();
            essence.trim().to_ascii_lowercase()
        })
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResultFormat {
    type Err = SparqlClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SparqlClientError::invalid_option("result_format", s))
    }
}
