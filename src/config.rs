//! Carousel configuration module.
//!
//! Handles loading, validating, and merging `carousel.toml`. Stock defaults are
//! overridden by whatever keys the user file sets, so the file only needs the
//! values that differ.
//!
//! ## Config File Location
//!
//! `carousel.toml` lives in the site root, next to the `images/` directory:
//!
//! ```text
//! site/
//! ├── carousel.toml
//! ├── index.html
//! └── images/
//!     ├── manifest.json
//!     └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [origin]
//! base_url = "http://localhost:8000/"   # Where the site is served from
//!
//! [loader]
//! manifest = "images/manifest.json"
//! fallback_manifest = "images/manifest.example.json"
//! repair = true                          # Probe covers and fill empty albums
//!
//! [probe]
//! batch_timeout_ms = 1000                # Discovery probes
//! foreground_timeout_ms = 1500           # Cover checks
//!
//! [discovery]
//! mode = "narrow"                        # "narrow" or "wide"
//! # miss_threshold = 3                   # Omit for the mode default (3 narrow, 5 wide)
//! # max_index = 20                       # Omit for the mode default (20 narrow, 80 wide)
//! extensions = [".JPG", ".jpg", ".jpeg", ".png", ".webp"]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up in the site root.
pub const CONFIG_FILENAME: &str = "carousel.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Carousel configuration loaded from `carousel.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Where the site (and therefore every image path) is served from.
    pub origin: OriginConfig,
    /// Manifest locations and whether to run the repair pass.
    pub loader: LoaderConfig,
    /// Probe timeouts.
    pub probe: ProbeConfig,
    /// Runtime discovery limits.
    pub discovery: DiscoveryConfig,
}

impl CarouselConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Url::parse(&self.origin.base_url).is_err() {
            return Err(ConfigError::Validation(format!(
                "origin.base_url is not a valid URL: {}",
                self.origin.base_url
            )));
        }
        if self.loader.manifest.is_empty() || self.loader.fallback_manifest.is_empty() {
            return Err(ConfigError::Validation(
                "loader manifest paths must not be empty".into(),
            ));
        }
        if self.probe.batch_timeout_ms == 0 || self.probe.foreground_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "probe timeouts must be greater than zero".into(),
            ));
        }
        if self.discovery.miss_threshold == Some(0) {
            return Err(ConfigError::Validation(
                "discovery.miss_threshold must be at least 1".into(),
            ));
        }
        if self.discovery.max_index == Some(0) {
            return Err(ConfigError::Validation(
                "discovery.max_index must be at least 1".into(),
            ));
        }
        if self.discovery.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "discovery.extensions must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .discovery
            .extensions
            .iter()
            .find(|e| !e.starts_with('.') || e.len() < 2)
        {
            return Err(ConfigError::Validation(format!(
                "discovery.extensions entries must look like \".jpg\", got {bad:?}"
            )));
        }
        Ok(())
    }
}

/// HTTP origin settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OriginConfig {
    pub base_url: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
        }
    }
}

/// Manifest loader settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Primary manifest path, relative to the origin.
    pub manifest: String,
    /// Consulted only when the primary manifest is unusable.
    pub fallback_manifest: String,
    /// Run the cover check and discovery after normalization.
    pub repair: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            manifest: "images/manifest.json".to_string(),
            fallback_manifest: "images/manifest.example.json".to_string(),
            repair: true,
        }
    }
}

/// Probe timeouts in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Per-probe timeout during discovery.
    pub batch_timeout_ms: u64,
    /// Per-probe timeout for cover checks.
    pub foreground_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            batch_timeout_ms: 1000,
            foreground_timeout_ms: 1500,
        }
    }
}

impl ProbeConfig {
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }

    pub fn foreground_timeout(&self) -> Duration {
        Duration::from_millis(self.foreground_timeout_ms)
    }
}

/// Which folders discovery searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Only the cover's folder.
    #[default]
    Narrow,
    /// `images/album<id>`, `images/album-<id>`, `images/a<id>`, then `images`.
    Wide,
}

impl DiscoveryMode {
    /// Consecutive fully-missed indices that end a run.
    pub fn default_miss_threshold(self) -> u32 {
        match self {
            Self::Narrow => 3,
            Self::Wide => 5,
        }
    }

    /// Highest sequence index probed.
    pub fn default_max_index(self) -> u32 {
        match self {
            Self::Narrow => 20,
            Self::Wide => 80,
        }
    }
}

/// Runtime discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    pub mode: DiscoveryMode,
    /// When absent, the mode default applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miss_threshold: Option<u32>,
    /// When absent, the mode default applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_index: Option<u32>,
    /// Tried in order for every sequence index.
    pub extensions: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            mode: DiscoveryMode::Narrow,
            miss_threshold: None,
            max_index: None,
            extensions: [".JPG", ".jpg", ".jpeg", ".png", ".webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DiscoveryConfig {
    pub fn effective_miss_threshold(&self) -> u32 {
        self.miss_threshold
            .unwrap_or_else(|| self.mode.default_miss_threshold())
    }

    pub fn effective_max_index(&self) -> u32 {
        self.max_index
            .unwrap_or_else(|| self.mode.default_max_index())
    }
}

// =============================================================================
// Config loading and layering
// =============================================================================

/// The stock defaults as section tables, ready to be overlaid.
pub fn stock_sections() -> toml::Table {
    match toml::Value::try_from(CarouselConfig::default()) {
        Ok(toml::Value::Table(sections)) => sections,
        _ => unreachable!("CarouselConfig serializes to a table"),
    }
}

/// Lay the sections of a user file over the stock sections.
///
/// `carousel.toml` is one level deep: every top-level key must be a section
/// table, and each key set inside a section replaces the stock value while the
/// section's other keys keep their defaults. A table where the stock file has a
/// plain value (`[probe.batch_timeout_ms]`) is rejected here so the error names
/// the offending key.
pub fn overlay_sections(
    mut stock: toml::Table,
    user: toml::Table,
) -> Result<toml::Table, ConfigError> {
    for (section, value) in user {
        let toml::Value::Table(keys) = value else {
            return Err(ConfigError::Validation(format!(
                "`{section}` must be a [{section}] section"
            )));
        };
        let Some(toml::Value::Table(target)) = stock.get_mut(&section) else {
            // Unknown section: left for deserialization to reject.
            stock.insert(section, toml::Value::Table(keys));
            continue;
        };
        for (key, value) in keys {
            if value.is_table() && target.get(&key).is_some_and(|v| !v.is_table()) {
                return Err(ConfigError::Validation(format!(
                    "{section}.{key} must be a value, not a table"
                )));
            }
            target.insert(key, value);
        }
    }
    Ok(stock)
}

/// Read `carousel.toml` from the site root. `Ok(None)` when there is no file.
pub fn read_user_sections(root: &Path) -> Result<Option<toml::Table>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Overlay the user sections (if any) on the defaults, then deserialize and validate.
pub fn resolve_config(user: Option<toml::Table>) -> Result<CarouselConfig, ConfigError> {
    let sections = match user {
        Some(user) => overlay_sections(stock_sections(), user)?,
        None => stock_sections(),
    };
    let config: CarouselConfig = toml::Value::Table(sections).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `carousel.toml` in the given site root.
pub fn load_config(root: &Path) -> Result<CarouselConfig, ConfigError> {
    resolve_config(read_user_sections(root)?)
}

/// Returns a fully-commented stock `carousel.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Album Carousel Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Origin: where the site is served from. Manifest and image paths are
# resolved against this URL.
# ---------------------------------------------------------------------------
[origin]
base_url = "http://localhost:8000/"

# ---------------------------------------------------------------------------
# Loader: the primary manifest is tried first, then the fallback. When both
# are unusable a single built-in album is shown.
# ---------------------------------------------------------------------------
[loader]
manifest = "images/manifest.json"
fallback_manifest = "images/manifest.example.json"
# Check each cover and rebuild empty albums by probing the origin.
repair = true

# ---------------------------------------------------------------------------
# Probe timeouts in milliseconds. A probe that does not answer in time
# counts as a miss.
# ---------------------------------------------------------------------------
[probe]
batch_timeout_ms = 1000
foreground_timeout_ms = 1500

# ---------------------------------------------------------------------------
# Discovery: how empty albums are rebuilt. Candidates are named
# ph<album>s<index><ext>.
#
#   narrow - search only the folder holding the album cover
#   wide   - search images/album<id>, images/album-<id>, images/a<id>, images
# ---------------------------------------------------------------------------
[discovery]
mode = "narrow"
# Stop after this many consecutive indices miss (default 3 narrow, 5 wide).
# miss_threshold = 3
# Highest index tried (default 20 narrow, 80 wide).
# max_index = 20
extensions = [".JPG", ".jpg", ".jpeg", ".png", ".webp"]
"##
}
