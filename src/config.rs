use config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const BASE_URL_VAR: &str = "MONITORING_URL";
pub const API_TOKEN_VAR: &str = "GRAFANA_API_KEY";

const DEFAULT_OUTPUT_DIR: &str = "./dashboard";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: Url,
    pub api_token: String,
    pub output_dir: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("required environment variable {0} is not set")]
    MissingVariable(&'static str),
    #[error("invalid {var} {value:?}: {source}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default)]
    monitoring_url: Option<String>,
    #[serde(default)]
    grafana_api_key: Option<String>,
    output_dir: PathBuf,
    timeout_secs: u64,
}

impl AppConfig {
    /// Loads settings from the process environment.
    pub fn load() -> Result<Self, AppConfigError> {
        Self::from_vars(lookup_vars(|key| std::env::var_os(key)))
    }

    pub fn from_vars(vars: Map<String, String>) -> Result<Self, AppConfigError> {
        let raw = Config::builder()
            .set_default("output_dir", DEFAULT_OUTPUT_DIR)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .add_source(Environment::default().source(Some(vars)))
            .build()?
            .try_deserialize::<RawSettings>()?;

        let base_url = required(raw.monitoring_url, BASE_URL_VAR)?;
        let api_token = required(raw.grafana_api_key, API_TOKEN_VAR)?;
        let base_url = Url::parse(&base_url).map_err(|source| AppConfigError::InvalidUrl {
            var: BASE_URL_VAR,
            value: base_url.clone(),
            source,
        })?;

        Ok(Self {
            base_url,
            api_token,
            output_dir: raw.output_dir,
            timeout: Duration::from_secs(raw.timeout_secs),
        })
    }
}

/// Reads only the recognised keys. A value that is not valid UTF-8 counts
/// as unset.
fn lookup_vars(lookup: impl Fn(&str) -> Option<OsString>) -> Map<String, String> {
    [BASE_URL_VAR, API_TOKEN_VAR]
        .into_iter()
        .filter_map(|key| {
            let value = lookup(key)?.into_string().ok()?;
            Some((key.to_string(), value))
        })
        .collect()
}

// An empty value counts as unset.
fn required(value: Option<String>, var: &'static str) -> Result<String, AppConfigError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(AppConfigError::MissingVariable(var))
}
