use std::sync::{Arc, Mutex};
use std::time::Duration;

use citescope_core::{
    AppConfig, CitationResult, Identifier, Preferences, SharedStore, StylePreference,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::citation::render_citation;
use crate::commands::state::PopupState;
use crate::error::Result;
use crate::identifiers::{ManualInput, Pmid, classify_input};
use crate::page::PageContent;
use crate::pmid_resolver::PmidResolver;
use crate::sources::{CitationService, doi_citation::DoiCitationClient, pubmed::PubMedClient};
use crate::styles::{StyleList, StyleLoader, StyleSource};
use crate::validation::suppress_subsumed;

pub const FETCHING_MESSAGE: &str = "Fetching citation...";
const EMPTY_INPUT_MESSAGE: &str = "Please enter a DOI or PMID.";
const INVALID_INPUT_MESSAGE: &str = "Invalid input. Please enter a valid DOI or PMID.";

/// Identifier rows found on the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectedList {
    pub dois: Vec<Identifier>,
    pub pmids: Vec<Identifier>,
}

impl DetectedList {
    pub const DOI_HEADING: &'static str = "Detected DOIs";
    pub const PMID_HEADING: &'static str = "Detected PMIDs:";

    pub fn is_empty(&self) -> bool {
        self.dois.is_empty() && self.pmids.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Identifier> {
        self.dois.iter().chain(self.pmids.iter())
    }
}

/// The popup: style dropdown, manual lookup box and detected identifiers.
///
/// Handlers take `&self` so several rows can be fetched at once; the state
/// lock is never held across an await.
pub struct Popup {
    citations: Arc<dyn CitationService>,
    pmids: PmidResolver,
    styles: StyleLoader,
    prefs: Preferences<SharedStore>,
    state: Mutex<PopupState>,
    style: Mutex<String>,
}

impl Popup {
    pub fn new(config: &AppConfig, store: SharedStore) -> Result<Self> {
        let citations: Arc<dyn CitationService> = Arc::new(DoiCitationClient::from_config(
            &config.services,
            &config.citation.lang,
        )?);
        let pubmed = PubMedClient::from_config(&config.services)?;
        let pmids = PmidResolver::with_throttle(
            pubmed,
            citations.clone(),
            Duration::from_millis(config.citation.pubmed_throttle_ms),
        );
        let styles = StyleLoader::from_config(store.clone(), citations.clone(), &config.citation);
        Ok(Self::with_parts(citations, pmids, styles, store))
    }

    pub fn with_parts(
        citations: Arc<dyn CitationService>,
        pmids: PmidResolver,
        styles: StyleLoader,
        store: SharedStore,
    ) -> Self {
        let default_style = styles.default_style().to_string();
        Self {
            citations,
            pmids,
            styles,
            prefs: Preferences::new(store),
            state: Mutex::new(PopupState::Idle),
            style: Mutex::new(default_style),
        }
    }

    pub fn state(&self) -> PopupState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Style used for the next lookup.
    pub fn current_style(&self) -> String {
        self.style.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Use `style` for this session without saving it as the preference.
    pub fn use_style(&self, style: &str) {
        self.set_current_style(style);
    }

    fn set_current_style(&self, style: &str) {
        *self.style.lock().unwrap_or_else(|e| e.into_inner()) = style.to_string();
    }

    /// Out-of-order transitions are logged but still applied: a lookup
    /// issued before the style list arrives runs with the default style.
    fn transition(&self, next: PopupState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.can_transition_to(next) {
            warn!("unexpected popup transition {:?} -> {next:?}", *state);
        }
        debug!("popup {:?} -> {next:?}", *state);
        *state = next;
    }

    /// Populates the style dropdown.
    pub async fn open(&self) -> StyleList {
        self.transition(PopupState::LoadingStyles);
        let list = self.styles.load().await;
        self.transition(match list.source {
            StyleSource::Fallback => PopupState::StylesFallback,
            StyleSource::Cache | StyleSource::Network => PopupState::StylesReady,
        });
        self.set_current_style(&list.selected);
        self.transition(PopupState::AwaitingUserAction);
        list
    }

    /// Dropdown change: use `style` from now on and remember it.
    pub fn select_style(&self, style: &str) -> Result<()> {
        self.set_current_style(style);
        self.prefs.set_preferred_style(&StylePreference::new(style))?;
        Ok(())
    }

    /// Lookup for whatever the user typed: a PMID, a DOI or a text containing a DOI.
    pub async fn manual_fetch(&self, input: &str) -> CitationResult {
        self.transition(PopupState::ManualFetch);
        let style = self.current_style();

        let result = match classify_input(input) {
            ManualInput::Empty => CitationResult::message(EMPTY_INPUT_MESSAGE),
            ManualInput::Invalid(raw) => {
                debug!("rejected manual input {raw:?}");
                CitationResult::message(INVALID_INPUT_MESSAGE)
            }
            ManualInput::Pmid(pmid) => self.pmids.resolve(&pmid, &style).await,
            ManualInput::Doi(doi) | ManualInput::DoiInText(doi) => {
                render_citation(self.citations.as_ref(), doi.as_str(), &style).await
            }
        };

        self.transition(PopupState::Rendered);
        result
    }

    /// Scans page content. With `validate`, DOIs that are fragments of longer
    /// matches are checked against the citation service first.
    pub async fn auto_detect(&self, page: &PageContent, validate: bool) -> DetectedList {
        self.transition(PopupState::AutoDetect);
        let found = page.identifiers();

        let dois = if validate {
            let style = self.current_style();
            suppress_subsumed(&found.dois, self.citations.as_ref(), &style).await
        } else {
            found.dois
        };

        DetectedList {
            dois: dois.into_iter().map(Identifier::Doi).collect(),
            pmids: found.pmids.into_iter().map(Identifier::Pmid).collect(),
        }
    }

    /// Row click: fetch the citation for one detected identifier.
    pub async fn activate(&self, id: &Identifier) -> CitationResult {
        let style = self.current_style();
        let result = match id {
            Identifier::Doi(doi) => {
                render_citation(self.citations.as_ref(), doi, &style).await
            }
            Identifier::Pmid(raw) => match Pmid::parse(raw) {
                Ok(pmid) => self.pmids.resolve(&pmid, &style).await,
                Err(_) => CitationResult::message(format!("Error fetching citation for PMID {raw}.")),
            },
        };
        self.transition(PopupState::Rendered);
        result
    }
}
