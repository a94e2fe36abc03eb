use super::CredentialSource;
use crate::error::CredentialError;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// File name of the staged service-account blob inside the temp directory.
pub const STAGED_CREDENTIALS_FILE: &str = "gemini-relay-service-account.json";

/// Write a raw service-account JSON blob to `target` and point `source` at it.
///
/// The blob is written verbatim; parsing happens on first use. Any existing
/// entry at `target` is unlinked first and the file is created exclusively,
/// owner-only on unix, so a planted symlink is never followed.
pub async fn stage_service_account(
    source: &mut CredentialSource,
    raw_json: &str,
    target: &Path,
) -> Result<PathBuf, CredentialError> {
    write_private(target, raw_json.as_bytes())
        .await
        .map_err(|e| CredentialError::Stage {
            path: target.to_path_buf(),
            source: e,
        })?;

    info!(
        path = %target.display(),
        "Service-account credentials staged"
    );
    source.service_account_path = Some(target.to_path_buf());
    Ok(target.to_path_buf())
}

async fn write_private(target: &Path, contents: &[u8]) -> std::io::Result<()> {
    match tokio::fs::remove_file(target).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(target).await?;
    file.write_all(contents).await?;
    file.flush().await
}

impl CredentialSource {
    /// Fixed staging location for `GOOGLE_SERVICE_ACCOUNT_JSON`.
    pub fn default_staging_path() -> PathBuf {
        std::env::temp_dir().join(STAGED_CREDENTIALS_FILE)
    }
}
