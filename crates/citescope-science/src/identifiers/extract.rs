use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::identifiers::cleanup::clean_doi;

static DOI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"10\.[0-9]{4,9}/[A-Za-z0-9_.()\-;/:]+").unwrap()
});

static PMID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?-u:\b)(?i-u:PMID)[:\s]*([0-9]{5,10})(?-u:\b)|(?i-u:https://pubmed\.ncbi\.nlm\.nih\.gov/)([0-9]{5,10})",
    )
    .unwrap()
});

/// DOIs and PMIDs found on a page, in first-seen order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedIdentifiers {
    pub dois: Vec<String>,
    pub pmids: Vec<String>,
}

impl ExtractedIdentifiers {
    pub fn is_empty(&self) -> bool {
        self.dois.is_empty() && self.pmids.is_empty()
    }
}

/// Insertion-ordered set of strings.
#[derive(Default)]
struct OrderedSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl OrderedSet {
    fn insert(&mut self, value: String) {
        if value.is_empty() || self.seen.contains(&value) {
            return;
        }
        self.seen.insert(value.clone());
        self.items.push(value);
    }
}

/// Scans page text, then each anchor href, for DOIs and PMIDs.
///
/// DOI matches are passed through [`clean_doi`]. Deduplication is
/// case-sensitive: `10.1000/ABC` and `10.1000/abc` are both kept.
pub fn extract_identifiers(text: &str, hrefs: &[String]) -> ExtractedIdentifiers {
    let mut dois = OrderedSet::default();
    let mut pmids = OrderedSet::default();

    let decoded_hrefs = hrefs.iter().map(|h| {
        urlencoding::decode(h)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| h.clone())
    });

    for source in std::iter::once(text.to_string()).chain(decoded_hrefs) {
        for m in DOI_REGEX.find_iter(&source) {
            dois.insert(clean_doi(m.as_str()));
        }
        for caps in PMID_REGEX.captures_iter(&source) {
            if let Some(id) = caps.get(1).or_else(|| caps.get(2)) {
                pmids.insert(id.as_str().to_string());
            }
        }
    }

    ExtractedIdentifiers {
        dois: dois.items,
        pmids: pmids.items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_dois_in_order() {
        let text = "Check out 10.1145/3313831.3376166 and also 10.1038/s41586-021-03819-2.";
        let found = extract_identifiers(text, &[]);
        assert_eq!(
            found.dois,
            vec!["10.1145/3313831.3376166", "10.1038/s41586-021-03819-2"]
        );
        assert!(found.pmids.is_empty());
    }

    #[test]
    fn test_duplicates_collapse_to_first_seen() {
        let text = "10.1000/b then 10.1000/a then 10.1000/b. again (10.1000/a)";
        let found = extract_identifiers(text, &[]);
        assert_eq!(found.dois, vec!["10.1000/b", "10.1000/a"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let found = extract_identifiers("10.1000/ABC and 10.1000/abc", &[]);
        assert_eq!(found.dois, vec!["10.1000/ABC", "10.1000/abc"]);
    }

    #[test]
    fn test_no_identifiers() {
        let found = extract_identifiers("nothing to see here, 10.12/too-short", &[]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_doi_followed_by_label() {
        let found = extract_identifiers("doi: 10.1000/xyz123.Published 2020", &[]);
        assert_eq!(found.dois, vec!["10.1000/xyz123"]);
    }

    #[test]
    fn test_pmid_label_and_url() {
        let text = "PMID: 12345678. See https://pubmed.ncbi.nlm.nih.gov/87654321/ and pmid 1234567";
        let found = extract_identifiers(text, &[]);
        assert_eq!(found.pmids, vec!["12345678", "87654321", "1234567"]);
    }

    #[test]
    fn test_word_boundaries_are_ascii() {
        assert_eq!(extract_identifiers("véPMID 12345678", &[]).pmids, vec!["12345678"]);
        assert!(extract_identifiers("xPMID 12345678", &[]).pmids.is_empty());
        assert!(extract_identifiers("10.1000/\u{212A}ab", &[]).dois.is_empty());
    }

    #[test]
    fn test_pmid_length_bounds() {
        assert_eq!(extract_identifiers("PMID: 12345", &[]).pmids, vec!["12345"]);
        assert_eq!(
            extract_identifiers("PMID: 1234567890", &[]).pmids,
            vec!["1234567890"]
        );
        assert!(extract_identifiers("PMID: 1234", &[]).pmids.is_empty());
        assert!(extract_identifiers("PMID: 12345678901", &[]).pmids.is_empty());
    }

    #[test]
    fn test_bare_number_is_not_a_pmid() {
        assert!(extract_identifiers("call 12345678 now", &[]).pmids.is_empty());
    }

    #[test]
    fn test_hrefs_are_scanned_after_text() {
        let hrefs = vec![
            "https://doi.org/10.5555%2Fhref-doi".to_string(),
            "https://pubmed.ncbi.nlm.nih.gov/23456789/".to_string(),
            "https://doi.org/10.1000/text-doi".to_string(),
        ];
        let found = extract_identifiers("Cited: 10.1000/text-doi", &hrefs);
        assert_eq!(found.dois, vec!["10.1000/text-doi", "10.5555/href-doi"]);
        assert_eq!(found.pmids, vec!["23456789"]);
    }
}
