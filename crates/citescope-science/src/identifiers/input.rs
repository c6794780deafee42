use once_cell::sync::Lazy;
use regex::Regex;

use crate::identifiers::{Doi, Pmid};

static DOI_EXACT: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^10\.[0-9]{4,9}/[^"]+$"#).unwrap());
static DOI_ANYWHERE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"10\.[0-9]{4,9}/[^"]+"#).unwrap());

/// What the user typed into the manual lookup box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualInput {
    Empty,
    Pmid(Pmid),
    Doi(Doi),
    /// A DOI embedded in a longer string, typically a `doi.org` link.
    DoiInText(Doi),
    Invalid(String),
}

pub fn classify_input(raw: &str) -> ManualInput {
    let input = raw.trim();
    if input.is_empty() {
        return ManualInput::Empty;
    }

    if let Ok(pmid) = Pmid::parse(input) {
        return ManualInput::Pmid(pmid);
    }

    if DOI_EXACT.is_match(input) {
        return match Doi::parse(input) {
            Ok(doi) => ManualInput::Doi(doi),
            Err(_) => ManualInput::Invalid(input.to_string()),
        };
    }

    if let Some(m) = DOI_ANYWHERE.find(input) {
        return match Doi::parse(m.as_str()) {
            Ok(doi) => ManualInput::DoiInText(doi),
            Err(_) => ManualInput::Invalid(input.to_string()),
        };
    }

    ManualInput::Invalid(input.to_string())
}
