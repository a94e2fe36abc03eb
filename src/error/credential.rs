use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CredentialError {
    #[error("no API key or service-account credentials configured")]
    NotConfigured,

    #[error("failed to stage service-account credentials at {path}: {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read service-account key file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid service-account key file: {0}")]
    InvalidKeyFile(#[from] serde_json::Error),

    #[error("failed to sign service-account assertion: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),

    #[error("token exchange request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token exchange rejected with status {status}: {body:.200}")]
    Exchange { status: StatusCode, body: String },

    #[error("token exchange response carried no usable access token")]
    MissingToken,
}
