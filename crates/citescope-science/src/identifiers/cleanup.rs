use once_cell::sync::Lazy;
use regex::Regex;

static QUOTES: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["'“”‘’]+"#).unwrap());

// `.` stops at a newline and `$` is end of input, so a label followed by
// more lines is left alone.
static TRAILING_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)(?i-u:Citations|References|Accessed|Published).*$").unwrap()
});

static TRAILING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,;:)\]}\s]+$").unwrap());

/// Normalizes a DOI candidate scraped from page text.
///
/// Removes quotation marks (straight and curly), a trailing label such as
/// `Published` together with everything after it, and trailing punctuation.
/// Applying it twice gives the same result as applying it once.
pub fn clean_doi(doi: &str) -> String {
    let s = QUOTES.replace_all(doi, "");
    let s = TRAILING_LABEL.replace(&s, "");
    let s = TRAILING_PUNCT.replace(&s, "");
    s.trim().to_string()
}
