use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::sanitization::SECRET_PLACEHOLDER;
use crate::SECRET_HEADER;

/// Ordered header mapping. Names compare case-insensitively through [`set_header`].
pub type HeaderMap = IndexMap<String, String>;

/// A documented remote operation cataloged by the upstream platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "path")]
    pub path_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Documentation blob, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge: Option<String>,
    #[serde(
        default,
        rename = "connectionPlatform",
        skip_serializing_if = "Option::is_none"
    )]
    pub platform: Option<String>,
}

/// A stored credential binding a user to a platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRef {
    pub key: String,
    pub platform: String,
    #[serde(default)]
    pub active: bool,
}

/// A connector the upstream platform can bind connections to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorDefinition {
    pub platform: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Caller payload, tagged by shape so the encoder and partitioner branch on a closed set.
///
/// JSON `null` never becomes a payload; callers hold `Option<Payload>` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Record(Map<String, JsonValue>),
    List(Vec<JsonValue>),
    Scalar(JsonValue),
}

impl Payload {
    /// Classify a JSON value. Returns `None` for `null`.
    pub fn from_json(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => None,
            JsonValue::Object(map) => Some(Payload::Record(map)),
            JsonValue::Array(items) => Some(Payload::List(items)),
            other => Some(Payload::Scalar(other)),
        }
    }

    pub fn into_json(self) -> JsonValue {
        match self {
            Payload::Record(map) => JsonValue::Object(map),
            Payload::List(items) => JsonValue::Array(items),
            Payload::Scalar(value) => value,
        }
    }

    pub fn as_record(&self) -> Option<&Map<String, JsonValue>> {
        match self {
            Payload::Record(map) => Some(map),
            _ => None,
        }
    }
}

/// Wire encoding selected by the caller's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyMode {
    #[default]
    Json,
    Multipart,
    UrlEncoded,
}

impl BodyMode {
    /// Multipart wins when both flags are set.
    pub fn from_flags(is_form_data: bool, is_form_url_encoded: bool) -> Self {
        if is_form_data {
            BodyMode::Multipart
        } else if is_form_url_encoded {
            BodyMode::UrlEncoded
        } else {
            BodyMode::Json
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            BodyMode::Json => "application/json",
            BodyMode::Multipart => "multipart/form-data",
            BodyMode::UrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

/// One text part of a multipart form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Encoded request body in the representation matching its [`BodyMode`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EncodedBody {
    Json(JsonValue),
    Multipart(Vec<FormField>),
    UrlEncoded(String),
}

/// Caller-supplied intent for a single action invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    pub action_id: String,
    pub connection_key: String,
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_variables: Option<IndexMap<String, JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<IndexMap<String, JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderMap>,
    #[serde(default)]
    pub is_form_data: bool,
    #[serde(default)]
    pub is_form_url_encoded: bool,
}

impl InvocationRequest {
    pub fn body_mode(&self) -> BodyMode {
        BodyMode::from_flags(self.is_form_data, self.is_form_url_encoded)
    }
}

/// Fully assembled passthrough request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: String,
    pub headers: HeaderMap,
    pub params: IndexMap<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<EncodedBody>,
}

impl RequestDescriptor {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Copy of this descriptor with the secret header swapped for the environment placeholder
    pub fn with_masked_secret(&self) -> Self {
        let mut masked = self.clone();
        if masked.header(SECRET_HEADER).is_some() {
            set_header(&mut masked.headers, SECRET_HEADER, SECRET_PLACEHOLDER);
        }
        masked
    }
}

/// Insert a header, replacing any existing entry whose name matches case-insensitively.
/// The replaced entry keeps its position; the new name's casing wins.
pub fn set_header(headers: &mut HeaderMap, name: &str, value: impl Into<String>) {
    let value = value.into();
    match headers.keys().position(|key| key.eq_ignore_ascii_case(name)) {
        Some(index) => {
            headers.shift_remove_index(index);
            headers.shift_insert(index, name.to_string(), value);
        }
        None => {
            headers.insert(name.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_classification() {
        assert!(Payload::from_json(JsonValue::Null).is_none());
        assert!(matches!(
            Payload::from_json(json!({"a": 1})),
            Some(Payload::Record(_))
        ));
        assert!(matches!(
            Payload::from_json(json!([1, 2])),
            Some(Payload::List(_))
        ));
        assert!(matches!(
            Payload::from_json(json!("text")),
            Some(Payload::Scalar(_))
        ));
    }

    #[test]
    fn test_invocation_request_deserialization() {
        let request: InvocationRequest = serde_json::from_value(json!({
            "actionId": "act_1",
            "connectionKey": "live::gmail::default::abc",
            "method": "post",
            "path": "/users/{{id}}",
            "data": {"id": 42, "name": "a"},
            "isFormUrlEncoded": true,
        }))
        .unwrap();

        assert_eq!(request.action_id, "act_1");
        assert!(matches!(request.data, Some(Payload::Record(_))));
        assert_eq!(request.body_mode(), BodyMode::UrlEncoded);
        assert!(request.headers.is_none());
    }

    #[test]
    fn test_null_data_is_absent() {
        let request: InvocationRequest = serde_json::from_value(json!({
            "actionId": "a",
            "connectionKey": "k",
            "method": "GET",
            "path": "/",
            "data": null,
        }))
        .unwrap();
        assert!(request.data.is_none());
    }

    #[test]
    fn test_body_mode_flags() {
        assert_eq!(BodyMode::from_flags(false, false), BodyMode::Json);
        assert_eq!(BodyMode::from_flags(true, false), BodyMode::Multipart);
        assert_eq!(BodyMode::from_flags(false, true), BodyMode::UrlEncoded);
        assert_eq!(BodyMode::from_flags(true, true), BodyMode::Multipart);
    }

    #[test]
    fn test_set_header_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("x-other".to_string(), "1".to_string());

        set_header(&mut headers, "content-type", "text/plain");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get_index(0).unwrap().0, "content-type");
        assert_eq!(headers["content-type"], "text/plain");
    }

    #[test]
    fn test_action_descriptor_from_upstream_row() {
        let action: ActionDescriptor = serde_json::from_value(json!({
            "_id": "conn_mod_def::abc",
            "title": "Send Email",
            "path": "/users/{{userId}}/messages/send",
            "method": "POST",
            "tags": ["email"],
            "connectionPlatform": "gmail",
        }))
        .unwrap();

        assert_eq!(action.id, "conn_mod_def::abc");
        assert_eq!(action.path_template, "/users/{{userId}}/messages/send");
        assert_eq!(action.platform.as_deref(), Some("gmail"));
        assert!(action.knowledge.is_none());
    }

    #[test]
    fn test_masked_secret_keeps_live_descriptor() {
        let mut headers = HeaderMap::new();
        headers.insert(SECRET_HEADER.to_string(), "sk_live_123".to_string());
        let descriptor = RequestDescriptor {
            url: "https://api.example.com/v1/passthrough/x".to_string(),
            method: "GET".to_string(),
            headers,
            params: IndexMap::new(),
            body: None,
        };

        let masked = descriptor.with_masked_secret();
        assert_eq!(masked.header(SECRET_HEADER), Some(SECRET_PLACEHOLDER));
        assert_eq!(descriptor.header(SECRET_HEADER), Some("sk_live_123"));
    }
}
