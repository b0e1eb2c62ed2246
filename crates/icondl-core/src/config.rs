use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::HttpOptions;
use crate::retry::RetryPolicy;

/// Default Iconify API base.
pub const DEFAULT_API_BASE: &str = "https://api.iconify.design";
/// Default base for full icon-set JSON definitions (one `<prefix>.json` per set).
pub const DEFAULT_GITHUB_RAW_BASE: &str =
    "https://raw.githubusercontent.com/iconify/icon-sets/master/json";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per icon (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 2,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// HTTP client settings (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Whole-request timeout for icon and listing GETs.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
            user_agent: format!("icondl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn to_options(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Global configuration loaded from `~/.config/icondl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcondlConfig {
    /// Iconify API base URL (listing and per-icon SVG endpoints).
    pub api_base: String,
    /// Base URL for `<prefix>.json` set definitions used as listing fallback.
    pub github_raw_base: String,
    /// Default number of concurrent download workers.
    pub jobs: usize,
    /// Exit non-zero when some icons failed to download.
    #[serde(default)]
    pub fail_on_partial: bool,
    /// Stop handing out tasks after this many consecutive filesystem errors (None = never).
    #[serde(default = "default_max_consecutive_fs_errors")]
    pub max_consecutive_fs_errors: Option<u32>,
    #[serde(default)]
    pub http: Option<HttpConfig>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_max_consecutive_fs_errors() -> Option<u32> {
    Some(10)
}

impl Default for IcondlConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            github_raw_base: DEFAULT_GITHUB_RAW_BASE.to_string(),
            jobs: 12,
            fail_on_partial: false,
            max_consecutive_fs_errors: default_max_consecutive_fs_errors(),
            http: None,
            retry: None,
        }
    }
}

impl IcondlConfig {
    pub fn http_options(&self) -> HttpOptions {
        self.http.clone().unwrap_or_default().to_options()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("icondl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<IcondlConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Same as [`load_or_init`] with an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<IcondlConfig> {
    if !path.exists() {
        let default_cfg = IcondlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("failed to write default config {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: IcondlConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
