//! Renders a reviewable code sample from a sanitized request descriptor

use super::url_builder::UrlBuilder;
use crate::error::ConnectorResult;
use picabridge_core::{EncodedBody, RequestDescriptor, SECRET_ENV_VAR, SECRET_PLACEHOLDER};
use std::fmt::Write as _;

/// Instruction attached to every generated sample
pub fn secret_instructions() -> String {
    format!(
        "Set the {var} environment variable before running this request. \
         The x-pica-secret header must be read from {var} at run time and never embedded literally in code.",
        var = SECRET_ENV_VAR
    )
}

/// Render a curl invocation for `descriptor`.
///
/// The descriptor is expected to be masked already; a header carrying the placeholder is
/// rendered as a shell variable reference.
pub fn render_curl(descriptor: &RequestDescriptor) -> ConnectorResult<String> {
    let url = UrlBuilder::join_with_query(&descriptor.url, &descriptor.params)?;
    let is_multipart = matches!(descriptor.body, Some(EncodedBody::Multipart(_)));

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("curl -X {} {}", descriptor.method, shell_quote(&url)));

    for (name, value) in &descriptor.headers {
        // curl derives the multipart content type and boundary itself
        if is_multipart && name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        if value == SECRET_PLACEHOLDER {
            lines.push(format!("  -H \"{}: ${}\"", name, SECRET_ENV_VAR));
        } else {
            lines.push(format!("  -H {}", shell_quote(&format!("{}: {}", name, value))));
        }
    }

    match &descriptor.body {
        None => {}
        Some(EncodedBody::Json(value)) => {
            lines.push(format!("  --data {}", shell_quote(&value.to_string())));
        }
        Some(EncodedBody::UrlEncoded(encoded)) => {
            lines.push(format!("  --data {}", shell_quote(encoded)));
        }
        Some(EncodedBody::Multipart(fields)) => {
            for field in fields {
                lines.push(format!(
                    "  --form-string {}",
                    shell_quote(&format!("{}={}", field.name, field.value))
                ));
            }
        }
    }

    let mut sample = String::new();
    let _ = writeln!(sample, "# Requires {} in the environment:", SECRET_ENV_VAR);
    let _ = writeln!(sample, "#   export {}=<your secret>", SECRET_ENV_VAR);
    let _ = writeln!(sample, "# Never paste the secret value into this command.");
    sample.push_str(&lines.join(" \\\n"));
    sample.push('\n');
    Ok(sample)
}

/// Single-quote a string for POSIX shells
fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use picabridge_core::{FormField, HeaderMap, SECRET_HEADER};
    use serde_json::json;

    fn descriptor(body: Option<EncodedBody>) -> RequestDescriptor {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert(SECRET_HEADER.to_string(), "sk_live_secret".to_string());
        headers.insert("x-pica-connection-key".to_string(), "live::slack::1".to_string());
        RequestDescriptor {
            url: "https://api.picaos.com/v1/passthrough/chat.postMessage".to_string(),
            method: "POST".to_string(),
            headers,
            params: IndexMap::new(),
            body,
        }
        .with_masked_secret()
    }

    #[test]
    fn test_render_json_request() {
        let sample =
            render_curl(&descriptor(Some(EncodedBody::Json(json!({"text": "it's ok"}))))).unwrap();

        assert!(sample.contains(
            "curl -X POST 'https://api.picaos.com/v1/passthrough/chat.postMessage'"
        ));
        assert!(sample.contains("-H \"x-pica-secret: $PICA_SECRET\""));
        assert!(sample.contains("-H 'x-pica-connection-key: live::slack::1'"));
        assert!(sample.contains(r#"--data '{"text":"it'\''s ok"}'"#));
        assert!(!sample.contains("sk_live_secret"));
        assert!(sample.starts_with("# Requires PICA_SECRET"));
    }

    #[test]
    fn test_render_multipart_skips_content_type() {
        let mut d = descriptor(Some(EncodedBody::Multipart(vec![FormField {
            name: "title".into(),
            value: "@not-a-file".into(),
        }])));
        d.headers
            .insert("Content-Type".to_string(), "multipart/form-data".to_string());

        let sample = render_curl(&d).unwrap();
        assert!(!sample.contains("Content-Type"));
        assert!(sample.contains("--form-string 'title=@not-a-file'"));
    }

    #[test]
    fn test_render_query_params() {
        let mut d = descriptor(None);
        d.method = "GET".to_string();
        d.params = serde_json::from_value(json!({"limit": 5})).unwrap();

        let sample = render_curl(&d).unwrap();
        assert!(sample.contains("/chat.postMessage?limit=5'"));
        assert!(!sample.contains("--data"));
    }

    #[test]
    fn test_instructions_name_env_var() {
        assert!(secret_instructions().contains("PICA_SECRET"));
    }
}
