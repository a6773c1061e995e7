//! Configuration management for flagview.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name under the platform config directory.
const APP_DIR_NAME: &str = "flagview";

/// Default location of the generated flag documents, relative to the
/// working directory.
const DEFAULT_DATA_DIR: &str = "public/docs/feature-flags";

/// Environment variable prefix.
const ENV_PREFIX: &str = "FLAGVIEW_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLAGVIEW_`, `__` between levels)
/// 2. TOML config file at `~/.config/flagview/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Flag data configuration.
    pub data: DataConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Page rendering configuration.
    pub render: RenderConfig,
}

/// Where flag documents are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the generated flag documents.
    pub dir: PathBuf,
    /// File extensions recognized as flag documents (without the dot).
    pub extensions: Vec<String>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub address: IpAddr,
    /// Port to listen on.
    pub port: u16,
}

/// Page rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Language tag attached to code previews for the client-side highlighter.
    pub preview_language: String,
    /// Definitions shown per card on the list page before truncating.
    pub list_preview_definitions: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_DATA_DIR),
            extensions: vec!["json".to_string()],
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            preview_language: "csharp".to_string(),
            list_preview_definitions: 2,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file at `config_path`, or the default path (if it exists)
    /// 3. Environment variables (prefixed with `FLAGVIEW_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.data.extensions.is_empty() {
            return Err(Error::ConfigValidation {
                message: "data.extensions must list at least one extension".to_string(),
            });
        }

        if let Some(bad) = self
            .data
            .extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(Error::ConfigValidation {
                message: format!("invalid extension {bad:?} (expected e.g. \"json\")"),
            });
        }

        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        let lang = &self.render.preview_language;
        if lang.is_empty()
            || !lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '#'))
        {
            return Err(Error::ConfigValidation {
                message: format!("invalid preview_language {lang:?}"),
            });
        }

        Ok(())
    }

    /// Socket address the server binds to.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.address, self.server.port)
    }
}
