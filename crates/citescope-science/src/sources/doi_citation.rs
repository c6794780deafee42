use std::time::Duration;

use async_trait::async_trait;
use citescope_core::ServicesConfig;
use tracing::debug;

use crate::error::Result;
use crate::http::HttpClient;
use crate::sources::CitationService;

const BIBLIOGRAPHY: &str = "text/x-bibliography";

/// Client for the DOI citation formatter (`/styles`, `/format`).
pub struct DoiCitationClient {
    client: HttpClient,
    base_url: String,
    lang: String,
}

impl DoiCitationClient {
    pub fn from_config(services: &ServicesConfig, lang: &str) -> Result<Self> {
        Self::with_params(
            &services.citation_base_url,
            lang,
            &services.user_agent,
            Duration::from_secs(services.timeout_secs),
        )
    }

    pub fn with_params(
        base_url: &str,
        lang: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(user_agent, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            lang: lang.to_string(),
        })
    }

    fn format_url(&self, doi: &str, style: &str) -> String {
        format!(
            "{}/format?doi={}&style={}&lang={}",
            self.base_url,
            urlencoding::encode(doi),
            urlencoding::encode(style),
            urlencoding::encode(&self.lang)
        )
    }
}

#[async_trait]
impl CitationService for DoiCitationClient {
    fn name(&self) -> &str {
        "citation.doi.org"
    }

    async fn list_styles(&self) -> Result<Vec<String>> {
        let url = format!("{}/styles", self.base_url);
        self.client.get_json(&url).await
    }

    async fn format_citation(&self, doi: &str, style: &str) -> Result<String> {
        let url = self.format_url(doi, style);
        debug!(doi, style, "requesting formatted citation");
        self.client.get_text(&url, Some(BIBLIOGRAPHY)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScienceError;
    use mockito::{Matcher, Server, ServerGuard};

    fn client_for(server: &ServerGuard) -> DoiCitationClient {
        DoiCitationClient::with_params(&server.url(), "en-US", "citescope-test", Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_format_citation_sends_query_and_accept() {
        let mut server = Server::new_async().await;
        let m = server.mock("GET", "/format")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("doi".into(), "10.1234/abcd".into()),
                Matcher::UrlEncoded("style".into(), "american-medical-association".into()),
                Matcher::UrlEncoded("lang".into(), "en-US".into()),
            ]))
            .match_header("accept", "text/x-bibliography")
            .with_status(200)
            .with_body("Doe, J. (2020).")
            .create_async().await;

        let text = client_for(&server)
            .format_citation("10.1234/abcd", "american-medical-association")
            .await
            .unwrap();

        assert_eq!(text, "Doe, J. (2020).");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_format_citation_http_error() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/format")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async().await;

        let err = client_for(&server)
            .format_citation("10.1234/missing", "apa")
            .await
            .unwrap_err();
        assert!(matches!(err, ScienceError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_list_styles() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/styles")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["vancouver", "apa", "american-medical-association"]"#)
            .create_async().await;

        let styles = client_for(&server).list_styles().await.unwrap();
        assert_eq!(styles, vec!["vancouver", "apa", "american-medical-association"]);
    }

    #[tokio::test]
    async fn test_resolves_follows_status() {
        let mut server = Server::new_async().await;
        let _ok = server.mock("GET", "/format")
            .match_query(Matcher::UrlEncoded("doi".into(), "10.1000/good".into()))
            .with_status(200)
            .with_body("cite")
            .create_async().await;
        let _bad = server.mock("GET", "/format")
            .match_query(Matcher::UrlEncoded("doi".into(), "10.1000/bad".into()))
            .with_status(404)
            .create_async().await;

        let client = client_for(&server);
        assert!(client.resolves("10.1000/good", "apa").await);
        assert!(!client.resolves("10.1000/bad", "apa").await);
    }
}
