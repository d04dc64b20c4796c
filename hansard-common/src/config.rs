//! Configuration loading
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file never aborts startup; it is reported
//! with a warning and the remaining tiers apply.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::time::{parse_filter_date, BackfillWindow};
use crate::{Error, Result};

pub const ENV_CONFIG_FILE: &str = "HANSARD_CONFIG";
pub const ENV_DATABASE: &str = "HANSARD_DATABASE";
pub const ENV_HOST: &str = "HANSARD_HOST";
pub const ENV_PORT: &str = "HANSARD_PORT";
pub const ENV_LOG_LEVEL: &str = "HANSARD_LOG_LEVEL";
pub const ENV_QUERY_TIMEOUT_MS: &str = "HANSARD_QUERY_TIMEOUT_MS";
pub const ENV_OVERVIEW_SOURCE: &str = "HANSARD_OVERVIEW_SOURCE";

/// Where the bill overview endpoint reads from when the request does not say
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverviewSource {
    /// Compute the five facets per request
    #[default]
    Live,
    /// Read the document written by the refresh job
    Materialized,
}

impl OverviewSource {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "live" => Some(OverviewSource::Live),
            "materialized" | "materialised" | "cached" => Some(OverviewSource::Materialized),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverviewSource::Live => "live",
            OverviewSource::Materialized => "materialized",
        }
    }
}

/// Compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub query_timeout_ms: u64,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            database_path: default_database_path(),
            host: "127.0.0.1".to_string(),
            port: 5780,
            log_level: "info".to_string(),
            query_timeout_ms: 10_000,
        }
    }
}

/// `~/.local/share/hansard/hansard.db` on Linux, the platform data dir elsewhere
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("hansard"))
        .unwrap_or_else(|| PathBuf::from("./hansard_data"))
        .join("hansard.db")
}

/// `[backfill]` table of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackfillToml {
    pub trailing_days: Option<u32>,
    /// `YYYY-MM-DD` sitting days; takes precedence over `trailing_days`
    pub sitting_days: Option<Vec<String>>,
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub query_timeout_ms: Option<u64>,
    pub overview_source: Option<OverviewSource>,
    #[serde(default)]
    pub backfill: BackfillToml,
}

impl TomlConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Backfill window described by the `[backfill]` table, if any
    pub fn backfill_window(&self) -> Option<BackfillWindow> {
        if let Some(days) = &self.backfill.sitting_days {
            let dates = days
                .iter()
                .filter_map(|raw| {
                    let parsed = parse_filter_date(raw);
                    if parsed.is_none() {
                        warn!("Ignoring malformed sitting day in config: {:?}", raw);
                    }
                    parsed
                })
                .collect();
            return Some(BackfillWindow::SittingDays(dates));
        }
        self.backfill.trailing_days.map(BackfillWindow::TrailingDays)
    }
}

/// Locate the config file: explicit path, then `~/.config/hansard/config.toml`,
/// then `/etc/hansard/config.toml`
pub fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join("hansard").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/hansard/config.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub overview_source: Option<OverviewSource>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct HansardConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Per-query deadline; `None` disables it
    pub query_timeout: Option<Duration>,
    pub overview_source: OverviewSource,
    pub backfill: BackfillWindow,
}

impl HansardConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for HansardConfig {
    fn default() -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        Self {
            database_path: defaults.database_path,
            host: defaults.host,
            port: defaults.port,
            log_level: defaults.log_level,
            query_timeout: Some(Duration::from_millis(defaults.query_timeout_ms)),
            overview_source: OverviewSource::default(),
            backfill: BackfillWindow::default(),
        }
    }
}

/// Resolves [`HansardConfig`] across CLI, environment, TOML and defaults
pub struct ConfigResolver {
    overrides: ConfigOverrides,
}

impl ConfigResolver {
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self { overrides }
    }

    pub fn resolve(&self) -> HansardConfig {
        let toml_config = self.load_toml();
        let defaults = CompiledDefaults::for_current_platform();

        let database_path = self
            .overrides
            .database_path
            .clone()
            .or_else(|| env_value(ENV_DATABASE).map(PathBuf::from))
            .or_else(|| toml_config.database_path.clone())
            .unwrap_or(defaults.database_path);

        let host = self
            .overrides
            .host
            .clone()
            .or_else(|| env_value(ENV_HOST))
            .or_else(|| toml_config.host.clone())
            .unwrap_or(defaults.host);

        let port = self
            .overrides
            .port
            .or_else(|| env_parsed(ENV_PORT))
            .or(toml_config.port)
            .unwrap_or(defaults.port);

        let log_level = self
            .overrides
            .log_level
            .clone()
            .or_else(|| env_value(ENV_LOG_LEVEL))
            .or_else(|| toml_config.log_level.clone())
            .unwrap_or(defaults.log_level);

        let query_timeout_ms = env_parsed(ENV_QUERY_TIMEOUT_MS)
            .or(toml_config.query_timeout_ms)
            .unwrap_or(defaults.query_timeout_ms);

        let overview_source = self
            .overrides
            .overview_source
            .or_else(|| env_value(ENV_OVERVIEW_SOURCE).and_then(|v| OverviewSource::from_str(&v)))
            .or(toml_config.overview_source)
            .unwrap_or_default();

        let backfill = toml_config.backfill_window().unwrap_or_default();

        HansardConfig {
            database_path,
            host,
            port,
            log_level,
            query_timeout: (query_timeout_ms > 0).then(|| Duration::from_millis(query_timeout_ms)),
            overview_source,
            backfill,
        }
    }

    fn load_toml(&self) -> TomlConfig {
        let Some(path) = locate_config_file(self.overrides.config_file.as_deref()) else {
            debug!("No config file found, using defaults");
            return TomlConfig::default();
        };

        match TomlConfig::load(&path) {
            Ok(config) => {
                debug!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_value(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}
