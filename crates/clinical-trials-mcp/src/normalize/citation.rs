//! Literature index normalization (esearch ids, esummary records).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{array, field};
use crate::models::{Citation, CitationSource};

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("valid year pattern"));

static DOI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"10\.\S+").expect("valid DOI pattern"));

const MIN_YEAR: u16 = 1800;
const MAX_YEAR: u16 = 2100;

fn trimmed(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Identifiers from an esearch response, in upstream order.
#[must_use]
pub fn esearch_ids(response: &Value) -> Vec<String> {
    array(field(field(response, "esearchresult"), "idlist"))
        .iter()
        .filter_map(trimmed)
        .map(str::to_string)
        .collect()
}

/// Citations from an esummary response, ordered by its `uids` list.
/// Records that fail normalization are dropped.
#[must_use]
pub fn esummary_citations(response: &Value) -> Vec<Citation> {
    let result = field(response, "result");
    array(field(result, "uids"))
        .iter()
        .filter_map(trimmed)
        .filter_map(|pmid| citation(pmid, field(result, pmid)))
        .collect()
}

/// Normalize one esummary record. Requires a numeric `pmid` and a title.
#[must_use]
pub fn citation(pmid: &str, summary: &Value) -> Option<Citation> {
    if pmid.is_empty() || !pmid.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let title = trimmed(field(summary, "title"))?;

    let pub_date = trimmed(field(summary, "pubdate"));
    let authors = array(field(summary, "authors"))
        .iter()
        .filter_map(|author| trimmed(field(author, "name")))
        .map(str::to_string)
        .collect();

    Some(Citation {
        pmid: pmid.to_string(),
        title: title.to_string(),
        journal: trimmed(field(summary, "fulljournalname"))
            .or_else(|| trimmed(field(summary, "source")))
            .map(str::to_string),
        year: pub_date.and_then(parse_year),
        doi: doi(summary),
        authors,
        pub_date: pub_date.map(str::to_string),
        source: CitationSource::default(),
    })
}

fn parse_year(pub_date: &str) -> Option<u16> {
    let year: u16 = YEAR_RE.find(pub_date)?.as_str().parse().ok()?;
    (MIN_YEAR..=MAX_YEAR).contains(&year).then_some(year)
}

fn doi(summary: &Value) -> Option<String> {
    let from_ids = array(field(summary, "articleids"))
        .iter()
        .filter(|id| field(id, "idtype").as_str() == Some("doi"))
        .find_map(|id| trimmed(field(id, "value")));
    if let Some(doi) = from_ids {
        return Some(doi.to_string());
    }

    let elocation = trimmed(field(summary, "elocationid"))?;
    DOI_RE.find(elocation).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_full_citation() {
        let summary = json!({
            "title": " Venetoclax in AML ",
            "fulljournalname": "Blood",
            "source": "Blood (J)",
            "pubdate": "2021 Mar 4",
            "authors": [{"name": "Smith J"}, {"name": " "}, {"name": "Doe A"}],
            "articleids": [{"idtype": "pubmed", "value": "1"}, {"idtype": "doi", "value": "10.1/abc"}]
        });
        let citation = citation("123", &summary).unwrap();
        assert_eq!(citation.title, "Venetoclax in AML");
        assert_eq!(citation.journal.as_deref(), Some("Blood"));
        assert_eq!(citation.year, Some(2021));
        assert_eq!(citation.doi.as_deref(), Some("10.1/abc"));
        assert_eq!(citation.authors, vec!["Smith J", "Doe A"]);
        assert_eq!(citation.pub_date.as_deref(), Some("2021 Mar 4"));
        assert_eq!(citation.source.db, "PUBMED");
    }

    #[test]
    fn test_doi_falls_back_to_elocation() {
        let summary = json!({"title": "T", "elocationid": "pii: S0006. doi: 10.1182/blood.2020"});
        assert_eq!(citation("1", &summary).unwrap().doi.as_deref(), Some("10.1182/blood.2020"));
    }

    #[test]
    fn test_missing_title_or_bad_pmid_drops_record() {
        assert!(citation("1", &json!({"title": "  "})).is_none());
        assert!(citation("12a", &json!({"title": "T"})).is_none());
        assert!(citation("", &json!({"title": "T"})).is_none());
    }

    #[test]
    fn test_year_outside_range_is_omitted() {
        let c = citation("1", &json!({"title": "T", "pubdate": "0999 Jan"})).unwrap();
        assert_eq!(c.year, None);
        assert_eq!(c.pub_date.as_deref(), Some("0999 Jan"));
    }

    #[test]
    fn test_journal_falls_back_to_source() {
        let c = citation("1", &json!({"title": "T", "source": "N Engl J Med"})).unwrap();
        assert_eq!(c.journal.as_deref(), Some("N Engl J Med"));
    }

    #[test]
    fn test_esummary_preserves_uid_order() {
        let response = json!({"result": {
            "uids": ["2", "1", "3"],
            "1": {"title": "One"},
            "2": {"title": "Two"},
            "3": {}
        }});
        let pmids: Vec<_> = esummary_citations(&response).into_iter().map(|c| c.pmid).collect();
        assert_eq!(pmids, vec!["2", "1"]);
    }

    #[test]
    fn test_esearch_ids() {
        let response = json!({"esearchresult": {"idlist": ["10", " ", 5, "11"]}});
        assert_eq!(esearch_ids(&response), vec!["10", "11"]);
        assert!(esearch_ids(&json!({})).is_empty());
    }
}
