//! URL building utilities for passthrough requests

use crate::error::{ConnectorError, ConnectorResult};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use url::Url;

/// Path prefix of the upstream proxying endpoint
pub const PASSTHROUGH_PREFIX: &str = "/v1/passthrough";

/// URL builder that handles slash normalization and query encoding
pub struct UrlBuilder;

impl UrlBuilder {
    /// Join a base URL and an already-resolved action path under the passthrough prefix
    ///
    /// Examples:
    /// - `passthrough("https://api.picaos.com", "/users")` -> `https://api.picaos.com/v1/passthrough/users`
    /// - `passthrough("https://api.picaos.com/", "//users")` -> `https://api.picaos.com/v1/passthrough/users`
    /// - `passthrough("https://api.picaos.com", "users")` -> `https://api.picaos.com/v1/passthrough/users`
    pub fn passthrough(base_url: &str, resolved_path: &str) -> String {
        format!(
            "{}{}/{}",
            base_url.trim_end_matches('/'),
            PASSTHROUGH_PREFIX,
            resolved_path.trim_start_matches('/')
        )
    }

    /// Join base URL with an upstream API path (catalog endpoints)
    pub fn api(base_url: &str, path: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Append query parameters to a URL
    pub fn join_with_query(url: &str, params: &IndexMap<String, JsonValue>) -> ConnectorResult<String> {
        let mut parsed = Url::parse(url)
            .map_err(|e| ConnectorError::InvalidConfig(format!("Invalid URL '{}': {}", url, e)))?;

        let pairs = Self::query_pairs(params);
        if !pairs.is_empty() {
            let mut query_pairs = parsed.query_pairs_mut();
            for (key, value) in &pairs {
                query_pairs.append_pair(key, value);
            }
        }

        Ok(parsed.to_string())
    }

    /// Flatten query parameters into string pairs.
    ///
    /// `null` values are dropped, arrays repeat the key once per element, objects are
    /// sent as JSON text.
    pub fn query_pairs(params: &IndexMap<String, JsonValue>) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in params {
            match value {
                JsonValue::Null => {}
                JsonValue::Array(items) => {
                    for item in items {
                        if let Some(text) = scalar_text(item) {
                            pairs.push((key.clone(), text));
                        }
                    }
                }
                other => {
                    if let Some(text) = scalar_text(other) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
        }
        pairs
    }

    /// Validate that a URL is well-formed
    pub fn validate(url: &str) -> ConnectorResult<()> {
        Url::parse(url)
            .map_err(|e| ConnectorError::InvalidConfig(format!("Invalid URL '{}': {}", url, e)))?;
        Ok(())
    }
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_passthrough_url_normalizes_slashes() {
        assert_eq!(
            UrlBuilder::passthrough("https://api.picaos.com", "/users"),
            "https://api.picaos.com/v1/passthrough/users"
        );
        assert_eq!(
            UrlBuilder::passthrough("https://api.picaos.com/", "//users/42"),
            "https://api.picaos.com/v1/passthrough/users/42"
        );
        assert_eq!(
            UrlBuilder::passthrough("https://api.picaos.com", "users"),
            "https://api.picaos.com/v1/passthrough/users"
        );
    }

    #[test]
    fn test_api_url() {
        assert_eq!(
            UrlBuilder::api("http://localhost:3005/", "/v1/vault/connections"),
            "http://localhost:3005/v1/vault/connections"
        );
    }

    #[test]
    fn test_join_with_query() {
        let params: IndexMap<String, JsonValue> = serde_json::from_value(json!({
            "q": "search term",
            "page": 1,
            "labels": ["a", "b"],
            "skip": null,
        }))
        .unwrap();

        let result = UrlBuilder::join_with_query("https://api.example.com/search", &params).unwrap();
        assert_eq!(
            result,
            "https://api.example.com/search?q=search+term&page=1&labels=a&labels=b"
        );
    }

    #[test]
    fn test_join_with_empty_query_leaves_url() {
        let result =
            UrlBuilder::join_with_query("https://api.example.com/x", &IndexMap::new()).unwrap();
        assert_eq!(result, "https://api.example.com/x");
    }

    #[test]
    fn test_url_validation() {
        assert!(UrlBuilder::validate("https://api.example.com/path").is_ok());
        assert!(UrlBuilder::validate("not-a-url").is_err());
    }
}
