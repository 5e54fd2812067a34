use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
const BASE_URL_ENV: &str = "DEEPSEEK_BASE_URL";

/// Startup-fatal configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("provider api key is not configured (set DEEPSEEK_API_KEY or providers.deepseek.api_key)")]
    MissingApiKey,

    #[error("cannot find home directory")]
    NoHomeDir,

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub chat: ChatDefaults,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub deepseek: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "ProviderConfig::default_base_url")]
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
        }
    }
}

impl ProviderConfig {
    fn default_base_url() -> String {
        "https://api.deepseek.com/v1".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatDefaults {
    #[serde(default = "ChatDefaults::default_model")]
    pub model: String,
    #[serde(default = "ChatDefaults::default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "ChatDefaults::default_temperature")]
    pub temperature: f64,
    #[serde(default = "ChatDefaults::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            max_tokens: Self::default_max_tokens(),
            temperature: Self::default_temperature(),
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

impl ChatDefaults {
    fn default_model() -> String {
        "deepseek-chat".to_string()
    }

    const fn default_max_tokens() -> u32 {
        1000
    }

    const fn default_temperature() -> f64 {
        1.3
    }

    const fn default_request_timeout_secs() -> u64 {
        30
    }
}

impl Config {
    /// Load configuration from `~/kaiwa/config.json`, then apply environment
    /// overrides. The file is optional when the credential comes from the
    /// environment; a missing api key from both sources is fatal.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).map_err(|source| {
                ConfigError::Io {
                    path: config_path.clone(),
                    source,
                }
            })?;
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?
        } else {
            Self {
                providers: ProvidersConfig {
                    deepseek: ProviderConfig::default(),
                },
                chat: ChatDefaults::default(),
            }
        };

        config.apply_env_overrides();

        if config.providers.deepseek.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        info!("Loaded config (endpoint: {})", config.providers.deepseek.base_url);
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.providers.deepseek.api_key = key;
            }
        }
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.providers.deepseek.base_url = url;
            }
        }
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    fn config_dir() -> Result<PathBuf, ConfigError> {
        Ok(dirs::home_dir().ok_or(ConfigError::NoHomeDir)?.join("kaiwa"))
    }

    pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir).map_err(|source| ConfigError::Io {
            path: config_dir.clone(),
            source,
        })?;
        Ok(config_dir)
    }

    /// Write a template config file for `kaiwa init`.
    pub fn create_config() -> Result<PathBuf, ConfigError> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            info!("Config already exists at {}", config_path.display());
            return Ok(config_path);
        }

        let template = Self {
            providers: ProvidersConfig {
                deepseek: ProviderConfig {
                    api_key: "your-api-key-here".to_string(),
                    base_url: ProviderConfig::default_base_url(),
                },
            },
            chat: ChatDefaults::default(),
        };

        let content = serde_json::to_string_pretty(&template).map_err(|source| {
            ConfigError::Parse {
                path: config_path.clone(),
                source,
            }
        })?;
        std::fs::write(&config_path, content).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;

        info!("Created config template at {}", config_path.display());
        Ok(config_path)
    }
}
