use std::fmt;

use serde::{Deserialize, Serialize};

/// A scholarly identifier found on a page or typed in by the user.
///
/// Values are stored exactly as cleaned; two identifiers are equal only if
/// their strings match byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Identifier {
    Doi(String),
    Pmid(String),
}

impl Identifier {
    pub fn value(&self) -> &str {
        match self {
            Self::Doi(v) | Self::Pmid(v) => v,
        }
    }

    /// Text shown on a detected-identifier row.
    pub fn label(&self) -> String {
        match self {
            Self::Doi(v) => v.clone(),
            Self::Pmid(v) => format!("PMID: {v}"),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}
