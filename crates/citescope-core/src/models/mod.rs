pub mod citation;
pub mod identifier;
pub mod preferences;

pub use citation::CitationResult;
pub use identifier::Identifier;
pub use preferences::{DEFAULT_STYLE, STYLE_CACHE_MAX_AGE_DAYS, StyleCache, StylePreference};
