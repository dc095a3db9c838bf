//! Composes the canonical passthrough request descriptor

use super::body_builder::BuiltBody;
use super::url_builder::UrlBuilder;
use crate::error::{ConnectorError, ConnectorResult};
use indexmap::IndexMap;
use picabridge_core::{
    set_header, HeaderMap, RequestDescriptor, ACTION_ID_HEADER, CONNECTION_KEY_HEADER,
    SECRET_HEADER,
};
use reqwest::Method;
use serde_json::Value as JsonValue;
use tracing::warn;

/// Headers the caller can never override; the engine owns their values
pub const RESERVED_HEADERS: &[&str] = &[SECRET_HEADER, CONNECTION_KEY_HEADER, ACTION_ID_HEADER];

/// Everything the assembler needs for one request
#[derive(Debug, Clone)]
pub struct AssemblyParts<'a> {
    pub base_url: &'a str,
    pub resolved_path: &'a str,
    pub method: &'a str,
    pub connection_key: &'a str,
    pub action_id: &'a str,
    pub secret: &'a str,
    pub explicit_headers: Option<&'a HeaderMap>,
    pub query_params: Option<&'a IndexMap<String, JsonValue>>,
    pub body: BuiltBody,
}

/// Normalize and validate an HTTP verb
pub fn normalize_method(method: &str) -> ConnectorResult<Method> {
    let upper = method.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(ConnectorError::InvalidInput("HTTP method is required".to_string()));
    }
    Method::from_bytes(upper.as_bytes())
        .map_err(|_| ConnectorError::InvalidInput(format!("Invalid HTTP method: {}", method)))
}

/// Assemble the request descriptor.
///
/// Header precedence, lowest to highest: base headers (JSON content type and secret),
/// routing headers, encoding headers, caller headers. Caller headers naming one of
/// [`RESERVED_HEADERS`] are dropped. GET requests never carry a body.
pub fn assemble(parts: AssemblyParts<'_>) -> ConnectorResult<RequestDescriptor> {
    let method = normalize_method(parts.method)?;
    let url = UrlBuilder::passthrough(parts.base_url, parts.resolved_path);

    let mut headers = HeaderMap::new();
    set_header(&mut headers, "Content-Type", "application/json");
    set_header(&mut headers, SECRET_HEADER, parts.secret);
    set_header(&mut headers, CONNECTION_KEY_HEADER, parts.connection_key);
    set_header(&mut headers, ACTION_ID_HEADER, parts.action_id);

    for (name, value) in &parts.body.headers {
        set_header(&mut headers, name, value.clone());
    }

    if let Some(explicit) = parts.explicit_headers {
        for (name, value) in explicit {
            if is_reserved(name) {
                warn!("Ignoring caller override of reserved header '{}'", name);
                continue;
            }
            set_header(&mut headers, name, value.clone());
        }
    }

    let body = if method == Method::GET {
        None
    } else {
        parts.body.body
    };

    Ok(RequestDescriptor {
        url,
        method: method.as_str().to_string(),
        headers,
        params: parts.query_params.cloned().unwrap_or_default(),
        body,
    })
}

fn is_reserved(name: &str) -> bool {
    RESERVED_HEADERS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::body_builder::BodyBuilder;
    use picabridge_core::{BodyMode, EncodedBody, Payload};
    use serde_json::json;

    fn parts<'a>(method: &'a str, body: BuiltBody) -> AssemblyParts<'a> {
        AssemblyParts {
            base_url: "https://api.picaos.com",
            resolved_path: "/users/42",
            method,
            connection_key: "live::gmail::default::abc",
            action_id: "conn_mod_def::send",
            secret: "sk_test_secret",
            explicit_headers: None,
            query_params: None,
            body,
        }
    }

    fn json_body(value: JsonValue) -> BuiltBody {
        let payload = Payload::from_json(value).unwrap();
        BodyBuilder::build(Some(&payload), BodyMode::Json)
    }

    #[test]
    fn test_assembles_url_and_routing_headers() {
        let descriptor = assemble(parts("post", json_body(json!({"name": "a"})))).unwrap();

        assert_eq!(descriptor.url, "https://api.picaos.com/v1/passthrough/users/42");
        assert_eq!(descriptor.method, "POST");
        assert_eq!(descriptor.header("content-type"), Some("application/json"));
        assert_eq!(descriptor.header(SECRET_HEADER), Some("sk_test_secret"));
        assert_eq!(
            descriptor.header(CONNECTION_KEY_HEADER),
            Some("live::gmail::default::abc")
        );
        assert_eq!(descriptor.header(ACTION_ID_HEADER), Some("conn_mod_def::send"));
        assert_eq!(descriptor.body, Some(EncodedBody::Json(json!({"name": "a"}))));
    }

    #[test]
    fn test_get_never_carries_body() {
        for method in ["get", "GET", "Get"] {
            let descriptor = assemble(parts(method, json_body(json!({"q": "x"})))).unwrap();
            assert_eq!(descriptor.method, "GET");
            assert!(descriptor.body.is_none());
        }
    }

    #[test]
    fn test_encoding_header_beats_default_content_type() {
        let payload = Payload::from_json(json!({"a": 1})).unwrap();
        let built = BodyBuilder::build(Some(&payload), BodyMode::UrlEncoded);
        let descriptor = assemble(parts("POST", built)).unwrap();

        assert_eq!(
            descriptor.header("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            descriptor
                .headers
                .keys()
                .filter(|k| k.eq_ignore_ascii_case("content-type"))
                .count(),
            1
        );
    }

    #[test]
    fn test_caller_header_overrides_content_type() {
        let mut explicit = HeaderMap::new();
        explicit.insert(
            "content-type".to_string(),
            "application/json; charset=utf-8".to_string(),
        );
        explicit.insert("X-Trace".to_string(), "t-1".to_string());

        let mut p = parts("POST", json_body(json!({})));
        p.explicit_headers = Some(&explicit);
        let descriptor = assemble(p).unwrap();

        assert_eq!(
            descriptor.header("Content-Type"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(descriptor.header("x-trace"), Some("t-1"));
    }

    #[test]
    fn test_caller_cannot_override_routing_headers() {
        let mut explicit = HeaderMap::new();
        explicit.insert(CONNECTION_KEY_HEADER.to_string(), "evil".to_string());
        explicit.insert("X-Pica-Action-Id".to_string(), "evil-action".to_string());
        explicit.insert("X-PICA-SECRET".to_string(), "stolen".to_string());

        let mut p = parts("POST", json_body(json!({})));
        p.explicit_headers = Some(&explicit);
        let descriptor = assemble(p).unwrap();

        assert_eq!(
            descriptor.header(CONNECTION_KEY_HEADER),
            Some("live::gmail::default::abc")
        );
        assert_eq!(descriptor.header(ACTION_ID_HEADER), Some("conn_mod_def::send"));
        assert_eq!(descriptor.header(SECRET_HEADER), Some("sk_test_secret"));
    }

    #[test]
    fn test_query_params_kept_verbatim() {
        let params: IndexMap<String, JsonValue> =
            serde_json::from_value(json!({"maxResults": 10, "q": "is:unread"})).unwrap();
        let mut p = parts("GET", BodyBuilder::build(None, BodyMode::Json));
        p.query_params = Some(&params);
        let descriptor = assemble(p).unwrap();

        assert_eq!(descriptor.params, params);
    }

    #[test]
    fn test_invalid_method_rejected() {
        let err = assemble(parts("NOT A VERB", json_body(json!({})))).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidInput(_)));

        let err = assemble(parts("  ", json_body(json!({})))).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidInput(_)));
    }
}
