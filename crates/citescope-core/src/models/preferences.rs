use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Style used when nothing else is known or the style list is unavailable.
pub const DEFAULT_STYLE: &str = "american-medical-association";

pub const STYLE_CACHE_MAX_AGE_DAYS: i64 = 30;

/// The user's preferred citation style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StylePreference(pub String);

impl StylePreference {
    pub fn new(style: impl Into<String>) -> Self {
        Self(style.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StylePreference {
    fn default() -> Self {
        Self(DEFAULT_STYLE.to_string())
    }
}

/// Cached list of available style names plus when it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleCache {
    pub styles: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl StyleCache {
    pub fn new(styles: Vec<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            styles,
            last_updated,
        }
    }

    /// Fresh while strictly younger than `max_age`.
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now.signed_duration_since(self.last_updated) < max_age
    }

    pub fn last_updated_millis(&self) -> i64 {
        self.last_updated.timestamp_millis()
    }

    pub fn from_millis(styles: Vec<String>, millis: i64) -> Option<Self> {
        let last_updated = Utc.timestamp_millis_opt(millis).single()?;
        Some(Self::new(styles, last_updated))
    }
}
