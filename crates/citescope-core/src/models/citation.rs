use serde::{Deserialize, Serialize};

/// Text rendered into a citation region, plus whether the copy control is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationResult {
    pub text: String,
    pub copy_visible: bool,
}

impl CitationResult {
    /// A formatted citation; the copy control is visible.
    pub fn citation(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            copy_visible: true,
        }
    }

    /// A status or error message; nothing to copy.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            copy_visible: false,
        }
    }

    pub fn is_citation(&self) -> bool {
        self.copy_visible
    }
}
