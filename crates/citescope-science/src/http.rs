use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, ScienceError};

// ─── HttpClient ───────────────────────────────────────────────────────────────

/// Thin GET-only client. Every call is a single attempt; failures are
/// returned to the caller as-is.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }

    pub async fn get(&self, url: &str) -> Result<String> {
        self.get_text(url, None).await
    }

    pub async fn get_text(&self, url: &str, accept: Option<&'static str>) -> Result<String> {
        debug!("GET {url}");
        let mut req = self.client.get(url);
        if let Some(accept) = accept {
            req = req.header(ACCEPT, HeaderValue::from_static(accept));
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScienceError::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        resp.text().await.map_err(ScienceError::Http)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let text = self.get_text(url, Some("application/json")).await?;
        serde_json::from_str(&text).map_err(|e| ScienceError::Parse(e.to_string()))
    }
}
