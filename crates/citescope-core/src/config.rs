use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::preferences::{DEFAULT_STYLE, STYLE_CACHE_MAX_AGE_DAYS};

/// Root application configuration, loaded from `~/.config/citescope/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub services: ServicesConfig,
    pub citation: CitationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the style preference and the style-list cache.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub citation_base_url: String,
    pub eutils_base_url: String,
    pub pubmed_base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationConfig {
    pub default_style: String,
    pub lang: String,
    pub style_cache_days: i64,
    /// Pause between a PubMed summary miss and the citation lookup.
    pub pubmed_throttle_ms: u64,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for StorageConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("citescope")
            .join("storage.json");
        Self {
            path: path.to_string_lossy().to_string(),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            citation_base_url: "https://citation.doi.org".to_string(),
            eutils_base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            pubmed_base_url: "https://pubmed.ncbi.nlm.nih.gov".to_string(),
            user_agent: concat!("citescope/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            default_style: DEFAULT_STYLE.to_string(),
            lang: "en-US".to_string(),
            style_cache_days: STYLE_CACHE_MAX_AGE_DAYS,
            pubmed_throttle_ms: 400,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/citescope/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("CITESCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("citescope")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.path)
    }
}
