use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::llm::{ModelSettings, ProviderKind, DEFAULT_TEMPERATURE};
use crate::suggestion::DEFAULT_TIMEOUT;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_PATH: &str = "workouts.db";
const DEFAULT_FRONTEND_DIR: &str = "frontend";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("Invalid value for {var} ({value:?}): {reason}")]
  Invalid {
    var: &'static str,
    value: String,
    reason: String,
  },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
  /// Directory holding index.html, styles.css and script.js
  pub frontend_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
  pub provider: ProviderKind,
  pub api_key: Option<String>,
  pub api_base: Option<Url>,
  pub settings: ModelSettings,
  pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub server: ServerConfig,
  pub database_path: PathBuf,
  pub llm: LlmConfig,
}

impl AppConfig {
  /// Read configuration from the process environment (call `dotenvy::dotenv()` first)
  pub fn from_env() -> Result<Self, ConfigError> {
    let provider = match var("LLM_PROVIDER") {
      Some(value) => value.parse::<ProviderKind>().map_err(|reason| ConfigError::Invalid {
        var: "LLM_PROVIDER",
        value,
        reason,
      })?,
      None => ProviderKind::OpenAi,
    };

    let api_base = match var("LLM_API_BASE") {
      Some(value) => Some(Url::parse(&value).map_err(|e| ConfigError::Invalid {
        var: "LLM_API_BASE",
        value: value.clone(),
        reason: e.to_string(),
      })?),
      None => None,
    };

    let temperature: f64 = parse_var("LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?;
    if !(0.0..=1.0).contains(&temperature) {
      return Err(ConfigError::Invalid {
        var: "LLM_TEMPERATURE",
        value: temperature.to_string(),
        reason: "must be between 0 and 1".to_string(),
      });
    }

    let timeout_secs: u64 = parse_var("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;
    if timeout_secs == 0 {
      return Err(ConfigError::Invalid {
        var: "LLM_TIMEOUT_SECS",
        value: "0".to_string(),
        reason: "must be positive".to_string(),
      });
    }

    Ok(Self {
      server: ServerConfig {
        host: var("WORKOUT_TRACKER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: parse_var("WORKOUT_TRACKER_PORT", DEFAULT_PORT)?,
        frontend_dir: var("WORKOUT_TRACKER_FRONTEND")
          .unwrap_or_else(|| DEFAULT_FRONTEND_DIR.to_string())
          .into(),
      },
      database_path: var("WORKOUT_TRACKER_DB")
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
        .into(),
      llm: LlmConfig {
        provider,
        api_key: var(provider.api_key_var()),
        api_base,
        settings: ModelSettings {
          model: var("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
          temperature,
        },
        timeout: Duration::from_secs(timeout_secs),
      },
    })
  }
}

/// Non-empty environment variable
fn var(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match var(name) {
    Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
      var: name,
      value: value.clone(),
      reason: e.to_string(),
    }),
    None => Ok(default),
  }
}
