//! Outbound Gemini v1beta `generateContent` request envelope.
//!
//! The relay only ever sends a single user turn carrying one text part, so
//! the schema is intentionally narrow compared to the full upstream surface.

use serde::{Deserialize, Serialize};

/// Gemini `generateContent` request body.
///
/// Reference: <https://ai.google.dev/gemini-api/docs/text-generation>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    /// Conversation turns; the relay always sends exactly one.
    pub contents: Vec<Content>,
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Usually `"user"` or `"model"`. Omitted on the wire when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Ordered parts that constitute a single message.
    pub parts: Vec<Part>,
}

/// One atomic piece of content inside a `Content` turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

impl GenerateContentRequest {
    /// Wrap a prompt into one `contents` entry holding one text part.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
        }
    }

    /// Text of the first part of the first turn, if any.
    pub fn prompt(&self) -> Option<&str> {
        self.contents
            .first()
            .and_then(|content| content.parts.first())
            .map(|part| part.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_prompt_serializes_to_single_text_part() {
        let req = GenerateContentRequest::from_prompt("hi there");
        let value = serde_json::to_value(&req).expect("serialize request");

        assert_eq!(
            value,
            json!({"contents": [{"parts": [{"text": "hi there"}]}]})
        );
    }

    #[test]
    fn prompt_reads_back_first_text_part() {
        let req = GenerateContentRequest::from_prompt("abc");
        assert_eq!(req.prompt(), Some("abc"));

        let empty = GenerateContentRequest { contents: vec![] };
        assert_eq!(empty.prompt(), None);
    }

    #[test]
    fn role_is_kept_when_present() {
        let req: GenerateContentRequest = serde_json::from_value(json!({
            "contents": [{"role": "user", "parts": [{"text": "x"}]}]
        }))
        .expect("parse request");

        assert_eq!(req.contents[0].role.as_deref(), Some("user"));
    }
}
