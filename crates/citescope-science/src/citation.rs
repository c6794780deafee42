use citescope_core::CitationResult;
use tracing::warn;

use crate::sources::CitationService;

/// Formats `doi` and turns any failure into the text shown in its place.
pub async fn render_citation(
    service: &dyn CitationService,
    doi: &str,
    style: &str,
) -> CitationResult {
    match service.format_citation(doi, style).await {
        Ok(text) => CitationResult::citation(text.trim_end()),
        Err(e) => {
            warn!("citation for {doi} failed: {e}");
            CitationResult::message(format!("Failed to fetch citation:\n{e}"))
        }
    }
}
