//! Request body encoding for the JSON, multipart and URL-encoded modes

use picabridge_core::{BodyMode, EncodedBody, FormField, HeaderMap, Payload};
use serde_json::{Map, Value as JsonValue};

/// Encoded body plus the headers the encoding requires
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltBody {
    pub body: Option<EncodedBody>,
    pub headers: HeaderMap,
}

/// Body builder for passthrough requests
pub struct BodyBuilder;

impl BodyBuilder {
    /// Encode `data` according to `mode`.
    ///
    /// JSON passes the payload through untouched and adds no headers beyond the default
    /// JSON content type set by the assembler. The form modes only read fields from record
    /// payloads; any other shape yields an empty form.
    pub fn build(data: Option<&Payload>, mode: BodyMode) -> BuiltBody {
        match mode {
            BodyMode::Json => BuiltBody {
                body: data.cloned().map(|payload| EncodedBody::Json(payload.into_json())),
                headers: HeaderMap::new(),
            },
            BodyMode::Multipart => Self::build_multipart(data.and_then(Payload::as_record)),
            BodyMode::UrlEncoded => Self::build_form(data.and_then(Payload::as_record)),
        }
    }

    /// Build multipart text parts, one per record field in order
    fn build_multipart(record: Option<&Map<String, JsonValue>>) -> BuiltBody {
        let fields = record
            .map(|record| {
                record
                    .iter()
                    .map(|(name, value)| FormField {
                        name: name.clone(),
                        value: field_text(value),
                    })
                    .collect()
            })
            .unwrap_or_default();

        BuiltBody {
            body: Some(EncodedBody::Multipart(fields)),
            headers: mode_header(BodyMode::Multipart),
        }
    }

    /// Build an `application/x-www-form-urlencoded` string from record fields in order
    fn build_form(record: Option<&Map<String, JsonValue>>) -> BuiltBody {
        let encoded = record
            .map(|record| {
                record
                    .iter()
                    .map(|(key, value)| {
                        format!(
                            "{}={}",
                            urlencoding::encode(key),
                            urlencoding::encode(&field_text(value))
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("&")
            })
            .unwrap_or_default();

        BuiltBody {
            body: Some(EncodedBody::UrlEncoded(encoded)),
            headers: mode_header(BodyMode::UrlEncoded),
        }
    }
}

fn mode_header(mode: BodyMode) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Content-Type".to_string(), mode.content_type().to_string());
    headers
}

/// Text form of a field value: strings verbatim, structured values as JSON text
fn field_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
