//! Application configuration for docview.
//!
//! User config lives at `~/.docview/docview.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DocViewError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docview.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docview";

// ---------------------------------------------------------------------------
// Config structs (matching docview.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation backend location.
    #[serde(default)]
    pub server: ServerConfig,

    /// Job polling behaviour.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Global defaults for the front-ends.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the backend, without the API prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix the generation routes are mounted under.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".into()
}
fn default_api_prefix() -> String {
    "/api".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[polling]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between two status polls.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    5
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Git hosting provider sent with every job (`github` or `gitlab`).
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Directory completed jobs are saved to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_provider() -> String {
    "github".into()
}
fn default_output_dir() -> String {
    "docview-output".into()
}

// ---------------------------------------------------------------------------
// Tracker config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime tracker configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Full API root, e.g. `http://localhost:3000/api`.
    pub api_root: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Interval between status polls.
    pub poll_interval: Duration,
}

impl From<&AppConfig> for TrackerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_root: join_api_root(&config.server.base_url, &config.server.api_prefix),
            request_timeout: Duration::from_secs(config.server.timeout_secs),
            poll_interval: Duration::from_secs(config.polling.interval_secs.max(1)),
        }
    }
}

/// Join a base URL and a path prefix without doubling or dropping slashes.
pub fn join_api_root(base_url: &str, api_prefix: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let prefix = api_prefix.trim_matches('/');
    if prefix.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{prefix}")
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docview/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocViewError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docview/docview.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocViewError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocViewError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocViewError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocViewError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocViewError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the configured base URL is an absolute http(s) URL.
pub fn validate_server(config: &AppConfig) -> Result<()> {
    let base = &config.server.base_url;
    let parsed = url::Url::parse(base)
        .map_err(|e| DocViewError::config(format!("invalid server.base_url '{base}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(DocViewError::config(format!(
            "server.base_url must use http or https, got '{other}'"
        ))),
    }
}
