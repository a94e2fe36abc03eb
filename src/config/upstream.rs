use super::Config;
use crate::upstream::{ModelCandidates, RetryPolicy};
use std::time::Duration;
use url::Url;

/// Effective upstream settings derived from `Config`.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_base: Url,
    pub models: ModelCandidates,
    pub retry: RetryPolicy,
    pub proxy: Option<Url>,
    pub request_timeout: Duration,
}

impl UpstreamConfig {
    pub(super) fn resolve(cfg: &Config) -> Self {
        Self {
            api_base: cfg.api_base.clone(),
            models: ModelCandidates::from(cfg.models.clone()),
            retry: RetryPolicy::new(
                cfg.retry_max_attempts,
                Duration::from_millis(cfg.retry_initial_delay_ms),
                cfg.retry_backoff_factor,
            ),
            proxy: cfg.proxy.clone(),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
        }
    }
}

pub(super) fn default_api_base() -> Url {
    Url::parse("https://generativelanguage.googleapis.com").expect("valid Gemini API base URL")
}

pub(super) fn default_models() -> Vec<String> {
    vec!["gemini-2.5-flash".to_string(), "gemini-2.0-flash".to_string()]
}

pub(super) fn default_retry_max_attempts() -> usize {
    7
}

pub(super) fn default_retry_initial_delay_ms() -> u64 {
    600
}

pub(super) fn default_retry_backoff_factor() -> f64 {
    1.8
}

pub(super) fn default_request_timeout_secs() -> u64 {
    600
}
