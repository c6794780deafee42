use async_trait::async_trait;

use crate::error::Result;

pub mod doi_citation;
pub mod pubmed;

/// Remote service that turns a DOI into bibliography text.
#[async_trait]
pub trait CitationService: Send + Sync {
    fn name(&self) -> &str;

    /// Names of every citation style the service can render.
    async fn list_styles(&self) -> Result<Vec<String>>;

    async fn format_citation(&self, doi: &str, style: &str) -> Result<String>;

    /// Whether the service can render `doi` at all.
    async fn resolves(&self, doi: &str, style: &str) -> bool {
        self.format_citation(doi, style).await.is_ok()
    }
}
