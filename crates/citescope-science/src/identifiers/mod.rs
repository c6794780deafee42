pub mod cleanup;
pub mod doi;
pub mod extract;
pub mod input;
pub mod pmid;

pub use cleanup::clean_doi;
pub use doi::Doi;
pub use extract::{ExtractedIdentifiers, extract_identifiers};
pub use input::{ManualInput, classify_input};
pub use pmid::Pmid;
