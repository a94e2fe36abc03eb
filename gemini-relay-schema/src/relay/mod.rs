//! Inbound and outbound bodies of the relay's own HTTP surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /api/generate` request body.
///
/// `prompt` is optional at the schema level so that an absent field reaches
/// validation instead of failing JSON extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateBody {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// `POST /api/generate` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReply {
    /// Candidate text extracted from the upstream response (may be empty).
    pub text: String,

    /// Upstream response JSON, passed through untouched.
    pub raw: Value,
}

/// `GET /health` body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthReply {
    pub ok: bool,
}

impl Default for HealthReply {
    fn default() -> Self {
        Self { ok: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generate_body_tolerates_missing_prompt() {
        let body: GenerateBody = serde_json::from_value(json!({})).expect("parse body");
        assert!(body.prompt.is_none());
    }

    #[test]
    fn health_reply_defaults_to_ok() {
        let value = serde_json::to_value(HealthReply::default()).expect("serialize health");
        assert_eq!(value, json!({"ok": true}));
    }
}
