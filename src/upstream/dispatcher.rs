use super::endpoints::{ModelEndpoints, PreparedRequest};
use super::extract::extract_text;
use super::retry::{RetryPolicy, send_with_retry};
use super::UPSTREAM_BODY_PREVIEW_CHARS;
use crate::config::UpstreamConfig;
use crate::credentials::CredentialResolver;
use crate::error::RelayError;
use crate::utils::logging::{body_preview, with_pretty_json_debug};
use gemini_relay_schema::GenerateContentRequest;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Ordered model identifiers; earlier entries are preferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidates(Arc<[String]>);

impl ModelCandidates {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for ModelCandidates {
    fn from(models: Vec<String>) -> Self {
        Self(models.into())
    }
}

/// A validated prompt wrapped into the upstream request envelope.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    body: GenerateContentRequest,
}

impl GenerationRequest {
    pub fn new(prompt: &str) -> Result<Self, RelayError> {
        if prompt.is_empty() {
            return Err(RelayError::missing_prompt());
        }
        Ok(Self {
            body: GenerateContentRequest::from_prompt(prompt),
        })
    }

    pub fn body(&self) -> &GenerateContentRequest {
        &self.body
    }
}

/// Successful generation from the first model that answered 2xx.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub model: String,
    pub text: String,
    pub raw: Value,
}

/// Walks the model candidates, sending each through the bounded-retry loop.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    resolver: CredentialResolver,
    endpoints: ModelEndpoints,
    models: ModelCandidates,
    policy: RetryPolicy,
}

impl Dispatcher {
    pub fn new(
        client: reqwest::Client,
        resolver: CredentialResolver,
        endpoints: ModelEndpoints,
        models: ModelCandidates,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            resolver,
            endpoints,
            models,
            policy,
        }
    }

    pub fn from_config(
        cfg: &UpstreamConfig,
        client: reqwest::Client,
        resolver: CredentialResolver,
    ) -> Self {
        Self::new(
            client,
            resolver,
            ModelEndpoints::new(cfg.api_base.clone()),
            cfg.models.clone(),
            cfg.retry,
        )
    }

    /// Generate text for `prompt`.
    ///
    /// A non-2xx status falls through to the next model; the last model's
    /// failure is reported. Transport exhaustion and credential failures abort
    /// immediately regardless of remaining candidates.
    pub async fn generate(&self, prompt: &str) -> Result<GenerationResult, RelayError> {
        let request = GenerationRequest::new(prompt)?;
        let total = self.models.len();
        let mut last_failure = None;

        for (index, model) in self.models.iter().enumerate() {
            let credential = self.resolver.resolve().await?;
            let prepared = PreparedRequest {
                model: model.to_string(),
                url: self.endpoints.generate_content(model),
                credential,
                body: request.body().clone(),
            };

            info!(
                model = %model,
                candidate = index + 1,
                candidates = total,
                auth = prepared.credential.kind(),
                "[Dispatcher] Sending generateContent"
            );

            let resp = send_with_retry(&self.client, &prepared, self.policy).await?;

            if resp.status.is_success() {
                let raw: Value = serde_json::from_str(&resp.body)?;
                with_pretty_json_debug(&raw, |pretty| {
                    tracing::debug!(model = %model, body = %pretty, "[Dispatcher] Upstream response");
                });
                let text = extract_text(&raw).unwrap_or_default();
                return Ok(GenerationResult {
                    model: model.to_string(),
                    text,
                    raw,
                });
            }

            if index + 1 < total {
                warn!(
                    model = %model,
                    status = %resp.status,
                    body = %body_preview(&resp.body, UPSTREAM_BODY_PREVIEW_CHARS),
                    "[Dispatcher] Model failed, falling back to next candidate"
                );
            }
            last_failure = Some(resp);
        }

        let failure = last_failure.ok_or(RelayError::NoModelCandidates)?;
        Err(RelayError::Upstream {
            status: failure.status,
            body: failure.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_is_rejected() {
        let err = GenerationRequest::new("").expect_err("empty prompt");
        assert!(matches!(err, RelayError::Validation(_)));
    }

    #[test]
    fn prompt_is_wrapped_once() {
        let request = GenerationRequest::new("tell me").expect("valid prompt");
        assert_eq!(request.body().prompt(), Some("tell me"));
        assert_eq!(request.body().contents.len(), 1);
    }

    #[test]
    fn candidates_keep_order() {
        let models = ModelCandidates::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(models.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(models.len(), 2);
    }
}
