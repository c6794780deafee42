use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScienceError};

static PMID_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{5,10}$").unwrap());

/// PubMed identifier: 5 to 10 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pmid(String);

impl Pmid {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if !PMID_SHAPE.is_match(input) {
            return Err(ScienceError::InvalidPmid(input.to_string()));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Pmid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
