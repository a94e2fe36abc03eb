mod basic;
mod upstream;

pub use upstream::UpstreamConfig;

use crate::credentials::CredentialSource;
use crate::error::ConfigError;
use basic::{
    default_listen_ip, default_port, deserialize_list_lax, deserialize_opt_json_lax,
    deserialize_opt_string_lax,
};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{net::IpAddr, path::PathBuf};
use url::Url;

/// Application configuration managed by Figment.
///
/// Built once at startup and handed to the relay by value; nothing reads the
/// environment after `Config::load` returns.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// HTTP server listen address.
    /// Env: `LISTEN_ADDR`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// Env: `PORT`. Default: `3000`.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// Env: `LOGLEVEL`. Default: `info`.
    #[serde(default)]
    pub loglevel: String,

    /// Static Gemini API key, sent as the `key` query parameter.
    /// Env: `GEMINI_API_KEY`. Takes precedence over any service account.
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub gemini_api_key: Option<String>,

    /// Raw service-account JSON; staged to a fixed file at startup.
    /// Env: `GOOGLE_SERVICE_ACCOUNT_JSON`.
    #[serde(default, deserialize_with = "deserialize_opt_json_lax")]
    pub google_service_account_json: Option<String>,

    /// Path to a service-account key file.
    /// Env: `GOOGLE_APPLICATION_CREDENTIALS`. Overridden by a staged `GOOGLE_SERVICE_ACCOUNT_JSON`.
    #[serde(default)]
    pub google_application_credentials: Option<PathBuf>,

    /// Upstream API origin.
    /// Env: `API_BASE`. Default: `https://generativelanguage.googleapis.com`.
    #[serde(default = "upstream::default_api_base")]
    pub api_base: Url,

    /// Candidate models in fallback order. Accepts a list or a comma-separated string.
    /// Env: `MODELS`. Default: `gemini-2.5-flash,gemini-2.0-flash`.
    #[serde(
        default = "upstream::default_models",
        deserialize_with = "deserialize_list_lax"
    )]
    pub models: Vec<String>,

    /// Attempt ceiling per model, including the first attempt.
    /// Env: `RETRY_MAX_ATTEMPTS`. Default: `7`.
    #[serde(default = "upstream::default_retry_max_attempts")]
    pub retry_max_attempts: usize,

    /// Delay before the first retry.
    /// Env: `RETRY_INITIAL_DELAY_MS`. Default: `600`.
    #[serde(default = "upstream::default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,

    /// Multiplicative growth applied to the delay after every retry.
    /// Env: `RETRY_BACKOFF_FACTOR`. Default: `1.8`.
    #[serde(default = "upstream::default_retry_backoff_factor")]
    pub retry_backoff_factor: f64,

    /// Optional upstream HTTP proxy.
    /// Env: `PROXY`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Whole-request timeout for a single upstream attempt.
    /// Env: `REQUEST_TIMEOUT_SECS`. Default: `600`.
    #[serde(default = "upstream::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            port: default_port(),
            loglevel: "info".to_string(),
            gemini_api_key: None,
            google_service_account_json: None,
            google_application_credentials: None,
            api_base: upstream::default_api_base(),
            models: upstream::default_models(),
            retry_max_attempts: upstream::default_retry_max_attempts(),
            retry_initial_delay_ms: upstream::default_retry_initial_delay_ms(),
            retry_backoff_factor: upstream::default_retry_backoff_factor(),
            proxy: None,
            request_timeout_secs: upstream::default_request_timeout_secs(),
        }
    }
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults, an optional `config.toml` and the environment.
    /// Env mapping is raw, so field names map to env vars in `UPPER_SNAKE_CASE`.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::raw().only(&Self::ENV_KEYS))
    }

    const ENV_KEYS: [&'static str; 13] = [
        "listen_addr",
        "port",
        "loglevel",
        "gemini_api_key",
        "google_service_account_json",
        "google_application_credentials",
        "api_base",
        "models",
        "retry_max_attempts",
        "retry_initial_delay_ms",
        "retry_backoff_factor",
        "proxy",
        "request_timeout_secs",
    ];

    /// Loads configuration (defaults + optional TOML + env) and validates it.
    pub fn load() -> Result<Self, ConfigError> {
        let cfg: Self = Self::figment().extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::NoModels);
        }
        if self.retry_max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry_max_attempts must be at least 1".to_string(),
            ));
        }
        if !self.retry_backoff_factor.is_finite() || self.retry_backoff_factor < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "retry_backoff_factor must be a finite number >= 1.0, got {}",
                self.retry_backoff_factor
            )));
        }
        Ok(())
    }

    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig::resolve(self)
    }

    /// Credential inputs before staging; the raw JSON blob is not written here.
    pub fn credential_source(&self) -> CredentialSource {
        CredentialSource {
            api_key: self
                .gemini_api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            service_account_path: self.google_application_credentials.clone(),
        }
    }
}
