use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScienceError};
use crate::identifiers::cleanup::clean_doi;

static DOI_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^10\.[0-9]{4,9}/.+$").unwrap());

const PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
    "DOI:",
];

/// A cleaned DOI of the form `10.<registrant>/<suffix>`.
///
/// Case is preserved: the citation service is queried with exactly what
/// the user or page supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Doi(String);

impl Doi {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let stripped = PREFIXES
            .iter()
            .find_map(|p| input.strip_prefix(p))
            .map(str::trim_start)
            .unwrap_or(input);

        let cleaned = clean_doi(stripped);
        if !DOI_SHAPE.is_match(&cleaned) {
            return Err(ScienceError::InvalidDoi(input.to_string()));
        }

        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl std::fmt::Display for Doi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
