//! knack-sleuth configuration management.
//!
//! Settings come from, in increasing precedence:
//! - built-in defaults
//! - the TOML file at `<config_dir>/knack-sleuth/config.toml` (or `--config`)
//! - environment variables, including a `.env` file in the working directory
//! - command-line flags, applied by the commands themselves

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SleuthError};
use crate::risk::RiskPolicy;
use crate::schema::Application;

pub const DEFAULT_API_BASE_URL: &str = "https://api.knack.com/v1";
pub const BUILDER_BASE_URL: &str = "https://builder.knack.com";
pub const NEXT_GEN_BUILDER_BASE_URL: &str = "https://builder-next.knack.com";

pub const ENV_APP_ID: &str = "KNACK_APP_ID";
pub const ENV_API_KEY: &str = "KNACK_API_KEY";
pub const ENV_NEXT_GEN_BUILDER: &str = "KNACK_NEXT_GEN_BUILDER";
pub const ENV_CACHE_DIR: &str = "KNACK_SLEUTH_CACHE_DIR";

/// knack-sleuth configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SleuthConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Impact likelihood thresholds and score weights
    #[serde(default)]
    pub risk: RiskPolicy,
}

/// Knack API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Application to fetch when no file is given
    #[serde(default)]
    pub app_id: Option<String>,

    /// Sent as `X-Knack-REST-API-Key` when present; metadata reads work without it
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Link to the next-generation builder instead of the classic one
    #[serde(default)]
    pub next_gen_builder: bool,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            app_id: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            next_gen_builder: false,
        }
    }
}

/// Metadata cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory path
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Cached documents older than this are refetched
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
}

fn default_max_age_hours() -> u64 {
    24
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_age_hours: default_max_age_hours(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("knack-sleuth").join("config.toml"))
}

impl SleuthConfig {
    /// Load from `path` (or the default location) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) => Self::load_from(&p)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from a specific path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| SleuthError::Config {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;
        Ok(config.normalized())
    }

    /// Overlay environment variables looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(app_id) = non_empty(ENV_APP_ID) {
            self.api.app_id = Some(app_id);
        }
        if let Some(api_key) = non_empty(ENV_API_KEY) {
            self.api.api_key = Some(api_key);
        }
        if let Some(flag) = non_empty(ENV_NEXT_GEN_BUILDER) {
            self.api.next_gen_builder = parse_flag(&flag);
        }
        if let Some(dir) = non_empty(ENV_CACHE_DIR) {
            self.cache.dir = Some(PathBuf::from(dir));
        }
    }

    fn normalized(mut self) -> Self {
        self.risk = self.risk.normalized();
        self
    }

    /// Builder base URL for page links
    pub fn builder_base_url(&self) -> &'static str {
        if self.api.next_gen_builder {
            NEXT_GEN_BUILDER_BASE_URL
        } else {
            BUILDER_BASE_URL
        }
    }

    /// Builder link to a page of `app`
    pub fn builder_page_url(&self, app: &Application, scene_key: &str) -> String {
        format!(
            "{}/{}/portal/pages/{}",
            self.builder_base_url(),
            app.account_slug(),
            scene_key
        )
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
