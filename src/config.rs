//! Bridge configuration module.
//!
//! Handles loading, validating, and merging `bridge.toml`. Stock defaults are
//! the base layer; the user file is merged on top key by key, and a handful of
//! environment variables are layered last so deployments can inject the store
//! identity and read token without writing them to disk.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [store]
//! project_id = ""           # Content store project id (required to query)
//! dataset = ""              # Dataset name (required to query)
//! api_version = "2023-10-01"
//! token = ""                # Read token for private datasets
//! api_host = "sanity.io"
//! timeout_secs = 20
//!
//! [cache]
//! enabled = true
//! ttl_secs = 900            # 15 minutes
//! dir = ".pmsb-cache"       # Where entries and the generation token live
//!
//! [site]
//! base_url = ""             # Prefix for generated links, e.g. "https://example.org"
//! default_limit = 24        # Photos per page when a request gives none
//! debug = false             # Show store error details in rendered notices
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Environment
//!
//! `PMSB_PROJECT_ID`, `PMSB_DATASET` and `PMSB_TOKEN` override the matching
//! `[store]` keys when set and non-empty.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILENAME: &str = "bridge.toml";

/// Store API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2023-10-01";

/// Cache lifetime for query results, in seconds.
pub const DEFAULT_TTL_SECS: u64 = 900;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Content store settings missing: {0}")]
    MissingStore(&'static str),
}

/// Bridge configuration loaded from `bridge.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Content store identity and transport settings.
    pub store: StoreConfig,
    /// Query result cache.
    pub cache: CacheConfig,
    /// Link generation and rendering switches.
    pub site: SiteConfig,
}

impl BridgeConfig {
    /// Validate config values are within acceptable ranges.
    ///
    /// A blank store identity is *not* a validation error: the bridge still
    /// renders chrome and configuration notices without one. Query time is
    /// where [`StoreConfig::identity`] turns it into an error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "store.timeout_secs must be non-zero".into(),
            ));
        }
        if self.store.api_host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.api_host must not be empty".into(),
            ));
        }
        if !(1..=60).contains(&self.site.default_limit) {
            return Err(ConfigError::Validation(
                "site.default_limit must be 1-60".into(),
            ));
        }
        if self.site.base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "site.base_url must not end with '/'".into(),
            ));
        }
        Ok(())
    }
}

/// Content store settings. Mirrors the fields an operator fills in once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Optional read token. All whitespace is stripped on load.
    pub token: String,
    pub api_host: String,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: String::new(),
            api_host: "sanity.io".to_string(),
            timeout_secs: 20,
        }
    }
}

impl StoreConfig {
    /// The identity every query and cache key is scoped to.
    ///
    /// Fails when any of project id, dataset or API version is blank.
    pub fn identity(&self) -> Result<StoreIdentity, ConfigError> {
        let project_id = self.project_id.trim();
        let dataset = self.dataset.trim();
        let api_version = self.api_version.trim();
        if project_id.is_empty() {
            return Err(ConfigError::MissingStore("project_id"));
        }
        if dataset.is_empty() {
            return Err(ConfigError::MissingStore("dataset"));
        }
        if api_version.is_empty() {
            return Err(ConfigError::MissingStore("api_version"));
        }
        Ok(StoreIdentity {
            project_id: project_id.to_string(),
            dataset: dataset.to_string(),
            api_version: api_version.to_string(),
        })
    }

    /// Read token, `None` when blank.
    pub fn bearer_token(&self) -> Option<&str> {
        Some(self.token.as_str()).filter(|t| !t.is_empty())
    }
}

/// Which store a query ran against. Part of every cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreIdentity {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
}

/// Query cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: DEFAULT_TTL_SECS,
            dir: PathBuf::from(".pmsb-cache"),
        }
    }
}

/// Rendering and link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Prefix prepended to every generated link. Empty means root-relative.
    pub base_url: String,
    pub default_limit: u32,
    /// Render store error details instead of the generic notice.
    pub debug: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_limit: 24,
            debug: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BridgeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BridgeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let mut config: BridgeConfig = merged.try_into()?;
    config.store.token = strip_whitespace(&config.store.token);
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when absent.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Layer `PMSB_*` variables from `lookup` on top of a loaded config.
///
/// Takes a lookup function rather than reading the process environment so the
/// precedence rules can be tested without mutating global state.
pub fn apply_env_overrides<F>(config: &mut BridgeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(v) = non_empty("PMSB_PROJECT_ID") {
        config.store.project_id = v.trim().to_string();
    }
    if let Some(v) = non_empty("PMSB_DATASET") {
        config.store.dataset = v.trim().to_string();
    }
    if let Some(v) = non_empty("PMSB_TOKEN") {
        config.store.token = strip_whitespace(&v);
    }
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Returns a fully-commented stock `bridge.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Photomuseum Bridge Configuration
# ================================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.
#
# PMSB_PROJECT_ID, PMSB_DATASET and PMSB_TOKEN in the environment override
# the matching [store] keys.

# ---------------------------------------------------------------------------
# Content store
# ---------------------------------------------------------------------------
[store]
# Project id and dataset are required before any view can be rendered.
project_id = ""
dataset = ""
api_version = "2023-10-01"

# Read-only token. Needed only when the dataset is private.
token = ""

# Queries go to https://{project_id}.api.{api_host}/v{api_version}/data/query/{dataset}
api_host = "sanity.io"

# Per-request network timeout. Store calls are never retried.
timeout_secs = 20

# ---------------------------------------------------------------------------
# Query cache
# ---------------------------------------------------------------------------
[cache]
enabled = true

# Successful results are reused for this long (15 minutes).
ttl_secs = 900

# Holds cached entries and the cache generation token.
# `photomuseum-bridge bust-cache` invalidates everything at once.
dir = ".pmsb-cache"

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Prefix for generated links. Leave empty for root-relative links.
base_url = ""

# Photos per page when a request does not set a limit (1-60).
default_limit = 24

# Show store error details in rendered notices.
debug = false
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_store_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.store.api_version, "2023-10-01");
        assert_eq!(config.store.api_host, "sanity.io");
        assert_eq!(config.store.timeout_secs, 20);
        assert_eq!(config.cache.ttl_secs, 900);
        assert_eq!(config.site.default_limit, 24);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILENAME)).unwrap();
        assert!(config.store.project_id.is_empty());
        assert!(config.cache.enabled);
    }

    #[test]
    fn load_config_reads_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
[store]
project_id = "abc123"
dataset = "production"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.store.project_id, "abc123");
        assert_eq!(config.store.dataset, "production");
        // Untouched keys keep stock values
        assert_eq!(config.store.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.cache.ttl_secs, DEFAULT_TTL_SECS);
    }

    #[test]
    fn token_whitespace_is_stripped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[store]\ntoken = \" sk abc\\n123 \"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.store.token, "skabc123");
        assert_eq!(config.store.bearer_token(), Some("skabc123"));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[store]\nprojectId = \"abc\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[store\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_limit() {
        let mut config = BridgeConfig::default();
        config.site.default_limit = 61;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.site.default_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_trailing_slash_base_url() {
        let mut config = BridgeConfig::default();
        config.site.base_url = "https://photomuseum.org.ge/".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn identity_requires_project_and_dataset() {
        let mut store = StoreConfig::default();
        assert!(matches!(
            store.identity(),
            Err(ConfigError::MissingStore("project_id"))
        ));
        store.project_id = "abc".into();
        assert!(matches!(
            store.identity(),
            Err(ConfigError::MissingStore("dataset"))
        ));
        store.dataset = "production".into();
        store.api_version = "  ".into();
        assert!(matches!(
            store.identity(),
            Err(ConfigError::MissingStore("api_version"))
        ));
        store.api_version = DEFAULT_API_VERSION.into();
        let id = store.identity().unwrap();
        assert_eq!(id.project_id, "abc");
        assert_eq!(id.dataset, "production");
    }

    #[test]
    fn env_overrides_win_over_file() {
        let mut config = BridgeConfig::default();
        config.store.project_id = "from-file".into();
        let env: HashMap<&str, &str> = [
            ("PMSB_PROJECT_ID", "from-env"),
            ("PMSB_DATASET", "  "),
            ("PMSB_TOKEN", "tok en"),
        ]
        .into_iter()
        .collect();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.store.project_id, "from-env");
        // Blank values are ignored
        assert!(config.store.dataset.is_empty());
        assert_eq!(config.store.token, "token");
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(stock_defaults_value(), Some(value)).unwrap();
        let defaults = BridgeConfig::default();
        assert_eq!(config.store.api_version, defaults.store.api_version);
        assert_eq!(config.cache.ttl_secs, defaults.cache.ttl_secs);
        assert_eq!(config.cache.dir, defaults.cache.dir);
        assert_eq!(config.site.default_limit, defaults.site.default_limit);
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge_preserves_base_keys() {
        let base: toml::Value =
            toml::from_str("[store]\ndataset = \"production\"\napi_host = \"sanity.io\"").unwrap();
        let overlay: toml::Value = toml::from_str("[store]\ndataset = \"staging\"").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["store"]["dataset"].as_str(), Some("staging"));
        assert_eq!(merged["store"]["api_host"].as_str(), Some("sanity.io"));
    }
}
