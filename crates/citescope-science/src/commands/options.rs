use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use citescope_core::{AppConfig, Preferences, SharedStore, StylePreference};
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::sources::{CitationService, doi_citation::DoiCitationClient};
use crate::styles::StyleLoader;

/// Outcome line on the options page; `ok` picks green or red.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub ok: bool,
}

impl StatusMessage {
    fn ok(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ok: true,
        }
    }

    fn failed(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ok: false,
        }
    }
}

/// The options page: reset preferences, force a style-list refresh.
pub struct Options {
    styles: StyleLoader,
    prefs: Preferences<SharedStore>,
}

impl Options {
    pub fn new(config: &AppConfig, store: SharedStore) -> Result<Self> {
        let service: Arc<dyn CitationService> = Arc::new(DoiCitationClient::from_config(
            &config.services,
            &config.citation.lang,
        )?);
        let styles = StyleLoader::from_config(store.clone(), service, &config.citation);
        Ok(Self::with_loader(styles, store))
    }

    pub fn with_loader(styles: StyleLoader, store: SharedStore) -> Self {
        Self {
            styles,
            prefs: Preferences::new(store),
        }
    }

    pub fn reset_defaults(&self) -> StatusMessage {
        let default = StylePreference::new(self.styles.default_style());
        match self.prefs.set_preferred_style(&default) {
            Ok(()) => StatusMessage::ok("Preferences reset to defaults."),
            Err(e) => {
                warn!("preference reset failed: {e}");
                StatusMessage::failed("Failed to reset preferences.")
            }
        }
    }

    pub async fn refresh_styles(&self) -> StatusMessage {
        match self.styles.refresh().await {
            Ok(_) => StatusMessage::ok("Style list successfully refreshed."),
            Err(e) => {
                warn!("style refresh failed: {e}");
                StatusMessage::failed("Failed to refresh style list.")
            }
        }
    }

    pub fn last_updated_text(&self) -> String {
        match self.styles.last_updated() {
            Ok(ts) => last_updated_label(ts),
            Err(e) => {
                warn!("could not read style timestamp: {e}");
                last_updated_label(None)
            }
        }
    }
}

/// `Last updated: <local time>` or `Last updated: never`.
pub fn last_updated_label(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => format!(
            "Last updated: {}",
            ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        None => "Last updated: never".to_string(),
    }
}
