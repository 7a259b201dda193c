//! Literature citation model.

use serde::{Deserialize, Serialize};

/// Provenance tag for citations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationSource {
    /// Always `PUBMED`.
    pub db: String,
}

impl Default for CitationSource {
    fn default() -> Self {
        Self { db: "PUBMED".to_string() }
    }
}

/// A normalized literature record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Numeric PubMed identifier.
    pub pmid: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,

    /// Four-digit publication year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    /// Raw publication date string as indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,

    #[serde(default)]
    pub source: CitationSource,
}
