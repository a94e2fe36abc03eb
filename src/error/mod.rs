mod config;
mod credential;
mod relay;

pub use config::ConfigError;
pub use credential::CredentialError;
pub use relay::RelayError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
