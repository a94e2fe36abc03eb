use serde::Serialize;

/// Render `value` as pretty JSON only when DEBUG logging is enabled.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty_json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
    log_action(pretty_json.as_str());
}

/// First `max_chars` characters of an upstream body, for log lines.
pub(crate) fn body_preview(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_preview_cuts_on_char_boundary() {
        assert_eq!(body_preview("héllo", 2), "hé");
        assert_eq!(body_preview("short", 300), "short");
        assert_eq!(body_preview("", 3), "");
    }
}
