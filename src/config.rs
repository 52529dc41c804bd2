//! Configuration loader plus strongly typed settings structures.
//!
//! The shipped defaults are embedded at compile time and extracted into the
//! data directory on first run. Every section is optional; anything missing
//! falls back to the built-in value.

use crate::core::animator::{AnimationTiming, DELETING_DELAY, PAUSE_DELAY, TYPING_DELAY};
use crate::core::catalog::{self, Catalog, LanguageCode};
use crate::core::driver::BLINK_INTERVAL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Embed default configuration at compile time
const DEFAULT_CONFIG: &str = include_str!("../defaults/config.toml");

/// Env var that overrides the data directory
pub const DATA_DIR_ENV: &str = "PORTFOLIO_DIR";

/// Port the greeting backend uses unless told otherwise
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Typing/blink delays in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_typing_ms")]
    pub typing_ms: u64,
    #[serde(default = "default_deleting_ms")]
    pub deleting_ms: u64,
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    #[serde(default = "default_blink_ms")]
    pub blink_ms: u64,
}

impl AnimationConfig {
    pub fn timing(&self) -> AnimationTiming {
        AnimationTiming {
            typing: Duration::from_millis(self.typing_ms),
            deleting: Duration::from_millis(self.deleting_ms),
            pause: Duration::from_millis(self.pause_ms),
        }
    }

    pub fn blink_interval(&self) -> Duration {
        // tokio's interval panics on a zero period
        Duration::from_millis(self.blink_ms.max(1))
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            typing_ms: default_typing_ms(),
            deleting_ms: default_deleting_ms(),
            pause_ms: default_pause_ms(),
            blink_ms: default_blink_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl StorageConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            poll_ms: default_poll_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64, // Event poll timeout (lower = higher FPS, higher CPU)
    #[serde(default = "default_cursor_glyph")]
    pub cursor_glyph: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout_ms(),
            cursor_glyph: default_cursor_glyph(),
        }
    }
}

/// Lines per language, as written in config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_fallback")]
    pub fallback: String,
    #[serde(default = "default_languages")]
    pub languages: BTreeMap<String, Vec<String>>,
}

impl CatalogConfig {
    pub fn to_catalog(&self) -> Result<Catalog> {
        let languages = self
            .languages
            .iter()
            .map(|(code, lines)| (LanguageCode::new(code.as_str()), lines.clone()))
            .collect();
        Catalog::new(languages, LanguageCode::new(self.fallback.as_str()))
            .context("Invalid [catalog] section")
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            languages: default_languages(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_typing_ms() -> u64 {
    TYPING_DELAY.as_millis() as u64
}

fn default_deleting_ms() -> u64 {
    DELETING_DELAY.as_millis() as u64
}

fn default_pause_ms() -> u64 {
    PAUSE_DELAY.as_millis() as u64
}

fn default_blink_ms() -> u64 {
    BLINK_INTERVAL.as_millis() as u64
}

fn default_poll_ms() -> u64 {
    500
}

fn default_poll_timeout_ms() -> u64 {
    16 // ~60 FPS
}

fn default_cursor_glyph() -> String {
    "▌".to_string()
}

fn default_fallback() -> String {
    catalog::FALLBACK_LANGUAGE.to_string()
}

fn default_languages() -> BTreeMap<String, Vec<String>> {
    let mut languages = BTreeMap::new();
    languages.insert(
        "en".to_string(),
        catalog::DEFAULT_EN.iter().map(|s| s.to_string()).collect(),
    );
    languages.insert(
        "ge".to_string(),
        catalog::DEFAULT_GE.iter().map(|s| s.to_string()).collect(),
    );
    languages
}

impl Config {
    /// Load config.toml from the data directory, extracting defaults first
    pub fn load() -> Result<Self> {
        Self::extract_defaults()?;
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load config from a custom file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
        let config = Self::parse(&contents)
            .context(format!("Failed to parse config file: {:?}", path))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate a config document
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        // Surface a bad catalog at load time rather than when the TUI starts
        config.catalog.to_catalog()?;
        Ok(config)
    }

    /// The embedded default config
    #[cfg(test)]
    pub fn embedded() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG).context("Failed to parse embedded default config")
    }

    /// Write the default config.toml if it doesn't exist yet
    fn extract_defaults() -> Result<()> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create data dir: {:?}", parent))?;
        }
        fs::write(&config_path, DEFAULT_CONFIG).context("Failed to write config.toml")?;
        tracing::info!("Extracted default config to {:?}", config_path);
        Ok(())
    }

    /// Get the base portfolio directory (~/.portfolio/)
    /// Can be overridden with the PORTFOLIO_DIR environment variable
    pub fn base_dir() -> Result<PathBuf> {
        if let Ok(custom_dir) = std::env::var(DATA_DIR_ENV) {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".portfolio"))
    }

    /// Returns: ~/.portfolio/config.toml
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.toml"))
    }

    /// Key–value preference file
    /// Returns: ~/.portfolio/storage.toml
    pub fn storage_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("storage.toml"))
    }

    /// Returns: ~/.portfolio/portfolio.log
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("portfolio.log"))
    }
}
