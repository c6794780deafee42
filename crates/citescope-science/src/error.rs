use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScienceError {
    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("invalid PMID: {0}")]
    InvalidPmid(String),

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; rendered the way the popup shows it.
    #[error("Error {status}: {reason}")]
    Api { status: u16, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("storage error: {0}")]
    Storage(#[from] citescope_core::CitescopeError),
}

impl ScienceError {
    /// True for failures that never reached an HTTP response.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, ScienceError>;
