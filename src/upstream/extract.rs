use serde_json::Value;

/// Candidate text from a `generateContent` response.
///
/// Two shapes are accepted, checked in order:
/// `candidates[0].content.parts[*].text` and `content[0].parts[*].text`.
/// Part texts are concatenated; parts without text are skipped. Returns
/// `None` when neither shape is present.
pub fn extract_text(body: &Value) -> Option<String> {
    ["/candidates/0/content/parts", "/content/0/parts"]
        .iter()
        .find_map(|pointer| body.pointer(pointer).and_then(Value::as_array))
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect()
        })
}
