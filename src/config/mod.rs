pub mod error;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::ResponseMode;
use crate::transport::BaseUrl;
use crate::transport::http::HttpConfig;

pub use error::{ConfigError, ConfigResult};

pub const ENV_PREFIX: &str = "COURSEBOT";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join("Library/Application Support/coursebot"))
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|c| c.join("coursebot"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|a| a.join("coursebot"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join(".config/coursebot"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin of the query service; `/api/query` is appended.
    pub api_base_url: String,
    pub mode: ResponseMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            mode: ResponseMode::Streaming,
            request_timeout_secs: None,
            connect_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Config file, then `COURSEBOT_*` environment variables. Falls back to
    /// defaults with a warning when either source is malformed.
    #[must_use]
    pub fn load() -> Self {
        let mut builder = Config::builder();

        if let Some(path) = Self::get_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        builder
            .build()
            .and_then(Config::try_deserialize)
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config: {e}");
                Self::default()
            })
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let config = Config::builder()
            .add_source(File::from(path).required(true))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn init_default() -> ConfigResult<PathBuf> {
        let path = Self::get_config_path().ok_or(ConfigError::NoConfigDir)?;
        Self::init_at(&path)?;
        Ok(path)
    }

    pub fn init_at(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        fs::write(path, include_str!("config.template.toml"))?;
        Ok(())
    }

    /// Applies command line flags on top of the loaded sources.
    #[must_use]
    pub fn with_overrides(mut self, api_base_url: Option<String>, no_stream: bool) -> Self {
        if let Some(url) = api_base_url {
            self.api_base_url = url;
        }
        if no_stream {
            self.mode = ResponseMode::SingleShot;
        }
        self
    }

    pub fn base_url(&self) -> ConfigResult<BaseUrl> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.api_base_url.clone()));
        }
        Ok(BaseUrl::new(url.to_string()))
    }

    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        let mut http = HttpConfig::new()
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs));
        if let Some(secs) = self.request_timeout_secs {
            http = http.with_timeout(Duration::from_secs(secs));
        }
        http
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
