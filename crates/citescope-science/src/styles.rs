use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use citescope_core::{
    CitationConfig, DEFAULT_STYLE, Preferences, STYLE_CACHE_MAX_AGE_DAYS, SharedStore,
    StyleCache, StylePreference,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::sources::CitationService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleSource {
    Cache,
    Network,
    /// The service was unreachable; only the default style is offered.
    Fallback,
}

/// Contents of the style dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleList {
    pub styles: Vec<String>,
    pub selected: String,
    pub source: StyleSource,
}

/// Loads the style list from the local cache or the citation service.
pub struct StyleLoader {
    prefs: Preferences<SharedStore>,
    service: Arc<dyn CitationService>,
    max_age: Duration,
    default_style: String,
}

impl StyleLoader {
    pub fn new(store: SharedStore, service: Arc<dyn CitationService>) -> Self {
        Self {
            prefs: Preferences::new(store),
            service,
            max_age: Duration::days(STYLE_CACHE_MAX_AGE_DAYS),
            default_style: DEFAULT_STYLE.to_string(),
        }
    }

    pub fn from_config(
        store: SharedStore,
        service: Arc<dyn CitationService>,
        config: &CitationConfig,
    ) -> Self {
        Self {
            prefs: Preferences::new(store),
            service,
            max_age: Duration::days(config.style_cache_days),
            default_style: config.default_style.clone(),
        }
    }

    pub fn default_style(&self) -> &str {
        &self.default_style
    }

    pub async fn load(&self) -> StyleList {
        self.load_at(Utc::now()).await
    }

    /// Never fails: storage trouble is treated as an empty cache and a
    /// failed fetch yields just the default style.
    pub async fn load_at(&self, now: DateTime<Utc>) -> StyleList {
        let saved = self
            .prefs
            .preferred_style()
            .unwrap_or_else(|e| {
                warn!("could not read preferred style: {e}");
                None
            })
            .unwrap_or_else(|| StylePreference::new(&self.default_style));

        let cached = self.prefs.style_cache().unwrap_or_else(|e| {
            warn!("could not read style cache: {e}");
            None
        });

        let (styles, source) = match cached {
            Some(cache) if cache.is_fresh(now, self.max_age) => {
                info!("loaded {} styles from local cache", cache.styles.len());
                (cache.styles, StyleSource::Cache)
            }
            _ => {
                info!("fetching styles from {}", self.service.name());
                match self.fetch_styles().await {
                    Ok(styles) => {
                        let cache = StyleCache::new(styles, now);
                        if let Err(e) = self.prefs.save_style_cache(&cache) {
                            warn!("could not persist style cache: {e}");
                        }
                        (cache.styles, StyleSource::Network)
                    }
                    Err(e) => {
                        warn!("failed to fetch styles: {e}");
                        (vec![self.default_style.clone()], StyleSource::Fallback)
                    }
                }
            }
        };

        let selected = if styles.iter().any(|s| s == saved.as_str()) {
            saved.0
        } else {
            self.default_style.clone()
        };

        StyleList {
            styles,
            selected,
            source,
        }
    }

    /// Fetch the list regardless of cache age and persist it.
    pub async fn refresh(&self) -> Result<StyleCache> {
        self.refresh_at(Utc::now()).await
    }

    /// Fails if either the fetch or the cache write fails.
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> Result<StyleCache> {
        let cache = StyleCache::new(self.fetch_styles().await?, now);
        self.prefs.save_style_cache(&cache)?;
        info!("fetched and cached {} styles", cache.styles.len());
        Ok(cache)
    }

    pub fn last_updated(&self) -> Result<Option<DateTime<Utc>>> {
        let millis = self.prefs.last_updated_millis()?;
        Ok(millis.and_then(DateTime::from_timestamp_millis))
    }

    async fn fetch_styles(&self) -> Result<Vec<String>> {
        let mut styles = self.service.list_styles().await?;
        styles.sort();
        Ok(styles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::doi_citation::DoiCitationClient;
    use crate::error::ScienceError;
    use citescope_core::{CitescopeError, KeyValueStore, MemoryStore};
    use mockito::{Server, ServerGuard};
    use serde_json::Value;

    /// Reads work, every write fails.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> citescope_core::Result<Option<Value>> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: Value) -> citescope_core::Result<()> {
            Err(CitescopeError::Storage("read-only".to_string()))
        }

        fn remove(&self, _key: &str) -> citescope_core::Result<()> {
            Err(CitescopeError::Storage("read-only".to_string()))
        }
    }

    fn loader(server: &ServerGuard, store: SharedStore) -> StyleLoader {
        let client = DoiCitationClient::with_params(
            &server.url(),
            "en-US",
            "citescope-test",
            std::time::Duration::from_secs(5),
        )
        .unwrap();
        StyleLoader::new(store, Arc::new(client))
    }

    fn store() -> SharedStore {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_fetches_sorts_and_caches() {
        let mut server = Server::new_async().await;
        let m = server.mock("GET", "/styles")
            .with_status(200)
            .with_body(r#"["vancouver", "apa", "american-medical-association"]"#)
            .create_async().await;

        let store = store();
        let now = Utc::now();
        let list = loader(&server, store.clone()).load_at(now).await;

        assert_eq!(list.styles, vec!["american-medical-association", "apa", "vancouver"]);
        assert_eq!(list.selected, "american-medical-association");
        assert_eq!(list.source, StyleSource::Network);

        let cache = Preferences::new(store).style_cache().unwrap().unwrap();
        assert_eq!(cache.styles, list.styles);
        assert_eq!(cache.last_updated_millis(), now.timestamp_millis());
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let mut server = Server::new_async().await;
        let m = server.mock("GET", "/styles").expect(0).create_async().await;

        let store = store();
        let now = Utc::now();
        Preferences::new(store.clone())
            .save_style_cache(&StyleCache::new(vec!["apa".into(), "ieee".into()], now - Duration::days(29)))
            .unwrap();

        let list = loader(&server, store).load_at(now).await;
        assert_eq!(list.styles, vec!["apa", "ieee"]);
        assert_eq!(list.source, StyleSource::Cache);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_stale_cache_is_refreshed() {
        let mut server = Server::new_async().await;
        let m = server.mock("GET", "/styles")
            .with_status(200)
            .with_body(r#"["ieee", "apa"]"#)
            .create_async().await;

        let store = store();
        let now = Utc::now();
        Preferences::new(store.clone())
            .save_style_cache(&StyleCache::new(vec!["old".into()], now - Duration::days(31)))
            .unwrap();

        let list = loader(&server, store).load_at(now).await;
        assert_eq!(list.styles, vec!["apa", "ieee"]);
        assert_eq!(list.source, StyleSource::Network);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_only_default() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/styles")
            .with_status(503)
            .create_async().await;

        let store = store();
        let list = loader(&server, store.clone()).load_at(Utc::now()).await;

        assert_eq!(list.styles, vec!["american-medical-association"]);
        assert_eq!(list.selected, "american-medical-association");
        assert_eq!(list.source, StyleSource::Fallback);
        assert_eq!(Preferences::new(store).style_cache().unwrap(), None);
    }

    #[tokio::test]
    async fn test_saved_preference_is_selected_when_listed() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/styles")
            .with_status(200)
            .with_body(r#"["apa", "american-medical-association"]"#)
            .create_async().await;

        let store = store();
        store.set("preferred_style", serde_json::json!("apa")).unwrap();
        let list = loader(&server, store).load_at(Utc::now()).await;
        assert_eq!(list.selected, "apa");
    }

    #[tokio::test]
    async fn test_unknown_preference_falls_back_to_default() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/styles")
            .with_status(200)
            .with_body(r#"["apa"]"#)
            .create_async().await;

        let store = store();
        store.set("preferred_style", serde_json::json!("chicago")).unwrap();
        let list = loader(&server, store).load_at(Utc::now()).await;
        assert_eq!(list.selected, "american-medical-association");
    }

    #[tokio::test]
    async fn test_refresh_updates_timestamp() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/styles")
            .with_status(200)
            .with_body(r#"["apa"]"#)
            .create_async().await;

        let store = store();
        let loader = loader(&server, store);
        assert_eq!(loader.last_updated().unwrap(), None);

        let now = Utc::now();
        loader.refresh_at(now).await.unwrap();
        assert_eq!(
            loader.last_updated().unwrap().map(|t| t.timestamp_millis()),
            Some(now.timestamp_millis())
        );
    }

    #[tokio::test]
    async fn test_refresh_reports_unsaved_cache() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/styles")
            .with_status(200)
            .with_body(r#"["apa"]"#)
            .create_async().await;

        let store: SharedStore = Arc::new(ReadOnlyStore(MemoryStore::new()));
        let loader = loader(&server, store);

        let err = loader.refresh_at(Utc::now()).await.unwrap_err();
        assert!(matches!(err, ScienceError::Storage(_)));
        assert_eq!(loader.last_updated().unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_uses_fetched_list_when_cache_write_fails() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/styles")
            .with_status(200)
            .with_body(r#"["ieee", "apa"]"#)
            .create_async().await;

        let store: SharedStore = Arc::new(ReadOnlyStore(MemoryStore::new()));
        let list = loader(&server, store).load_at(Utc::now()).await;
        assert_eq!(list.styles, vec!["apa", "ieee"]);
        assert_eq!(list.source, StyleSource::Network);
    }
}
