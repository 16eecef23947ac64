use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded from `config.toml`; missing keys fall back to defaults and a
/// missing file means all defaults. CLI flags override what is loaded here.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load config from the default location, or defaults if there is none
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from an explicit path, or defaults if it does not exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that parse but cannot be used
    pub fn validate(&self) -> crate::Result<()> {
        self.cache.expiration()?;
        Ok(())
    }

    /// Save config to the default location
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `<config_dir>/quotd/config.toml`
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("quotd");

        Ok(config_dir.join("config.toml"))
    }

    /// `<data_dir>/quotd`, home of the database and preferences
    pub fn data_dir() -> crate::Result<PathBuf> {
        Ok(dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("quotd"))
    }

    /// Database location: configured path or `<data_dir>/quotd/quotes.db`
    pub fn database_path(&self) -> crate::Result<PathBuf> {
        match &self.cache.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("quotes.db")),
        }
    }

    /// Location of the persisted cursor, next to the database
    pub fn preferences_path(&self) -> crate::Result<PathBuf> {
        let db_path = self.database_path()?;
        let dir = match db_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => Self::data_dir()?,
        };
        Ok(dir.join("preferences.json"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// ZenQuotes-compatible API root
    #[serde(default = "default_api_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures (429, 5xx, transport). 0 disables.
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

fn default_api_url() -> String {
    "https://zenquotes.io/api".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_initial_delay_ms() -> u64 {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Age after which a cached batch is refetched
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: u64,

    /// Override for the SQLite file location
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl CacheConfig {
    pub fn expiration(&self) -> crate::Result<Duration> {
        i64::try_from(self.expiration_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                crate::Error::ConfigError(format!(
                    "cache.expiration_hours is out of range: {}",
                    self.expiration_hours
                ))
            })
    }
}

fn default_expiration_hours() -> u64 {
    24
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiration_hours: default_expiration_hours(),
            database_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Show the quote of the day above the current quote
    #[serde(default = "default_show_today_quote")]
    pub show_today_quote: bool,
}

fn default_show_today_quote() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_today_quote: default_show_today_quote(),
        }
    }
}
