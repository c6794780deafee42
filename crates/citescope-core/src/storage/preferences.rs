use serde_json::{Value, json};
use tracing::warn;

use super::KeyValueStore;
use crate::error::Result;
use crate::models::{StyleCache, StylePreference};

const PREFERRED_STYLE_KEY: &str = "preferred_style";
const STYLES_CACHE_KEY: &str = "cached_styles";
const STYLES_TIMESTAMP_KEY: &str = "styles_last_updated";

/// Typed access to the entries citescope keeps in a [`KeyValueStore`].
#[derive(Clone)]
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn preferred_style(&self) -> Result<Option<StylePreference>> {
        Ok(self
            .store
            .get(PREFERRED_STYLE_KEY)?
            .and_then(|v| v.as_str().map(StylePreference::new))
            .filter(|p| !p.as_str().is_empty()))
    }

    pub fn set_preferred_style(&self, style: &StylePreference) -> Result<()> {
        self.store.set(PREFERRED_STYLE_KEY, json!(style.as_str()))
    }

    /// The cached style list, if both the list and its timestamp are stored.
    pub fn style_cache(&self) -> Result<Option<StyleCache>> {
        let styles = self.store.get(STYLES_CACHE_KEY)?;
        let millis = self.last_updated_millis()?;

        let (Some(styles), Some(millis)) = (styles, millis) else {
            return Ok(None);
        };

        let styles: Vec<String> = match serde_json::from_value(styles) {
            Ok(s) => s,
            Err(e) => {
                warn!("ignoring unreadable style cache: {e}");
                return Ok(None);
            }
        };

        Ok(StyleCache::from_millis(styles, millis))
    }

    pub fn save_style_cache(&self, cache: &StyleCache) -> Result<()> {
        self.store.set_many(vec![
            (STYLES_CACHE_KEY.to_string(), json!(cache.styles)),
            (
                STYLES_TIMESTAMP_KEY.to_string(),
                json!(cache.last_updated_millis()),
            ),
        ])
    }

    pub fn last_updated_millis(&self) -> Result<Option<i64>> {
        Ok(self
            .store
            .get(STYLES_TIMESTAMP_KEY)?
            .as_ref()
            .and_then(Value::as_i64)
            .filter(|ms| *ms > 0))
    }
}
