use std::sync::Arc;
use std::time::Duration;

use citescope_core::CitationResult;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::citation::render_citation;
use crate::error::Result;
use crate::identifiers::{Doi, Pmid};
use crate::sources::{CitationService, pubmed::PubMedClient};

/// Turns a PMID into citation text.
///
/// Tries the PubMed summary for a DOI and formats that; without a DOI it
/// waits `throttle` and asks PubMed for its own AMA citation.
pub struct PmidResolver {
    pubmed: PubMedClient,
    citations: Arc<dyn CitationService>,
    throttle: Duration,
}

impl PmidResolver {
    pub fn with_throttle(
        pubmed: PubMedClient,
        citations: Arc<dyn CitationService>,
        throttle: Duration,
    ) -> Self {
        Self {
            pubmed,
            citations,
            throttle,
        }
    }

    pub async fn resolve(&self, pmid: &Pmid, style: &str) -> CitationResult {
        match self.try_resolve(pmid, style).await {
            Ok(result) => result,
            Err(e) => {
                warn!("PMID fetch error for {pmid}: {e}");
                CitationResult::message(format!("Error fetching citation for PMID {pmid}."))
            }
        }
    }

    async fn try_resolve(&self, pmid: &Pmid, style: &str) -> Result<CitationResult> {
        if let Some(doi) = self.lookup_doi(pmid).await? {
            debug!("PMID {pmid} maps to DOI {doi}");
            return Ok(render_citation(self.citations.as_ref(), doi.as_str(), style).await);
        }

        info!("no DOI for PMID {pmid}, falling back to PubMed citation lookup");
        sleep(self.throttle).await;

        match self.pubmed.fetch_citation(pmid).await? {
            Some(text) => Ok(CitationResult::citation(text)),
            None => Ok(CitationResult::message(format!(
                "PMID {pmid} found, but no citation info was available."
            ))),
        }
    }

    /// A missing, empty, unreadable or error-status summary all count as "no DOI";
    /// only transport failures abort the chain.
    async fn lookup_doi(&self, pmid: &Pmid) -> Result<Option<Doi>> {
        match self.pubmed.fetch_doi(pmid).await {
            Ok(Some(raw)) => match Doi::parse(&raw) {
                Ok(doi) => Ok(Some(doi)),
                Err(e) => {
                    warn!("PubMed summary for {pmid} has unusable DOI: {e}");
                    Ok(None)
                }
            },
            Ok(None) => Ok(None),
            Err(e) if e.is_network() => Err(e),
            Err(e) => {
                warn!("PubMed summary for {pmid} unavailable: {e}");
                Ok(None)
            }
        }
    }
}
