//! Citescope Science: DOI/PMID detection, citation formatting, PubMed lookups.

pub mod error;
pub mod http;
pub mod identifiers;
pub mod citation;
pub mod sources;
pub mod pmid_resolver;
pub mod styles;
pub mod validation;
pub mod page;
pub mod commands;

pub use error::{Result, ScienceError};
pub use identifiers::{Doi, ExtractedIdentifiers, ManualInput, Pmid, clean_doi, classify_input, extract_identifiers};
pub use sources::{CitationService, doi_citation::DoiCitationClient, pubmed::PubMedClient};
pub use pmid_resolver::PmidResolver;
pub use styles::{StyleList, StyleLoader, StyleSource};
pub use page::PageContent;
pub use commands::{ClipboardSink, DetectedList, Options, Popup, PopupState, copy_citation};
