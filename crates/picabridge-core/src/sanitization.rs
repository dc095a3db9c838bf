//! Utilities for keeping the platform secret out of logs and generated output

use crate::types::HeaderMap;
use serde_json::{Map, Value as JsonValue};

/// Environment variable consumers must source the secret from
pub const SECRET_ENV_VAR: &str = "PICA_SECRET";

/// Value substituted for the secret header in anything meant for display
pub const SECRET_PLACEHOLDER: &str = "${PICA_SECRET}";

/// Masked value for sensitive headers in debug output
const REDACTED: &str = "***REDACTED***";

/// Header name fragments that mark a value as sensitive (case-insensitive)
const SENSITIVE_PATTERNS: &[&str] = &[
    "secret",
    "authorization",
    "token",
    "api-key",
    "apikey",
    "cookie",
    "password",
];

/// Check if a header name indicates sensitive data
pub fn is_sensitive_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SENSITIVE_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// Header names only, in insertion order
pub fn header_names(headers: &HeaderMap) -> Vec<String> {
    headers.keys().cloned().collect()
}

/// Copy of `headers` with sensitive values masked, for debug logging
pub fn mask_headers(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if is_sensitive_header(name) {
                REDACTED.to_string()
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}

/// Replace every literal occurrence of `secret` in `text` with the placeholder.
/// An empty secret leaves the text untouched.
pub fn redact_secret(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, SECRET_PLACEHOLDER)
}

/// Apply [`redact_secret`] to every string and object key inside a JSON value
pub fn redact_secret_in_json(value: &mut JsonValue, secret: &str) {
    if secret.is_empty() {
        return;
    }
    match value {
        JsonValue::String(text) => {
            if text.contains(secret) {
                *text = redact_secret(text, secret);
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                redact_secret_in_json(item, secret);
            }
        }
        JsonValue::Object(map) => {
            let entries = std::mem::take(map);
            *map = entries
                .into_iter()
                .map(|(key, mut item)| {
                    redact_secret_in_json(&mut item, secret);
                    (redact_secret(&key, secret), item)
                })
                .collect::<Map<String, JsonValue>>();
        }
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_sensitive_header() {
        assert!(is_sensitive_header("x-pica-secret"));
        assert!(is_sensitive_header("Authorization"));
        assert!(is_sensitive_header("X-Api-Key"));
        assert!(is_sensitive_header("Set-Cookie"));

        assert!(!is_sensitive_header("x-pica-connection-key"));
        assert!(!is_sensitive_header("Content-Type"));
        assert!(!is_sensitive_header("x-pica-action-id"));
    }

    #[test]
    fn test_mask_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-pica-secret".to_string(), "sk_test_1".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        let masked = mask_headers(&headers);
        assert_eq!(masked["x-pica-secret"], REDACTED);
        assert_eq!(masked["Content-Type"], "application/json");
    }

    #[test]
    fn test_redact_secret() {
        let text = "curl -H 'x-pica-secret: sk_test_1' -d '{\"echo\":\"sk_test_1\"}'";
        let redacted = redact_secret(text, "sk_test_1");
        assert!(!redacted.contains("sk_test_1"));
        assert_eq!(redacted.matches(SECRET_PLACEHOLDER).count(), 2);

        assert_eq!(redact_secret("unchanged", ""), "unchanged");
    }

    #[test]
    fn test_redact_secret_in_json_touches_strings_and_keys_only() {
        let mut value = json!({
            "url": "url",
            "nested": [{"url": 1}, "prefix-url"],
            "count": 3
        });
        redact_secret_in_json(&mut value, "url");
        assert_eq!(
            value,
            json!({
                "${PICA_SECRET}": "${PICA_SECRET}",
                "nested": [{"${PICA_SECRET}": 1}, "prefix-${PICA_SECRET}"],
                "count": 3
            })
        );
    }
}
