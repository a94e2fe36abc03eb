mod service_account;
mod staging;
mod token;

pub use service_account::{CLOUD_PLATFORM_SCOPE, ServiceAccountKey};
pub use staging::{STAGED_CREDENTIALS_FILE, stage_service_account};
pub use token::{TokenResponse, TokenValue};

use crate::error::CredentialError;
use std::path::PathBuf;
use tracing::debug;

/// Authorization attached to a single upstream call.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Sent as the `key` query parameter.
    ApiKey(String),
    /// Sent as `Authorization: Bearer <token>`.
    BearerToken(String),
}

impl Credential {
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::ApiKey(_) => "api_key",
            Credential::BearerToken(_) => "bearer_token",
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple(self.kind()).field(&"<redacted>").finish()
    }
}

/// Where credentials come from, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct CredentialSource {
    pub api_key: Option<String>,
    pub service_account_path: Option<PathBuf>,
}

/// Produces a fresh `Credential` per call. Tokens are never cached.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    source: CredentialSource,
    client: reqwest::Client,
}

impl CredentialResolver {
    pub fn new(source: CredentialSource, client: reqwest::Client) -> Self {
        Self { source, client }
    }

    /// API key wins whenever present; otherwise exchange a service-account assertion.
    pub async fn resolve(&self) -> Result<Credential, CredentialError> {
        if let Some(key) = &self.source.api_key {
            return Ok(Credential::ApiKey(key.clone()));
        }

        let Some(path) = &self.source.service_account_path else {
            return Err(CredentialError::NotConfigured);
        };

        let key = ServiceAccountKey::load(path).await?;
        let token = key.fetch_access_token(&self.client).await?;
        debug!(
            client_email = %key.client_email,
            project_id = key.project_id.as_deref().unwrap_or("-"),
            "Service-account access token acquired"
        );
        Ok(Credential::BearerToken(token))
    }
}
