//! `{{name}}` placeholder resolution for passthrough path templates

use crate::error::{ConnectorError, ConnectorResult};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("placeholder pattern is valid"));

/// Placeholder names in order of first appearance, without duplicates
pub fn required_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for captures in PLACEHOLDER.captures_iter(template) {
        let name = captures[1].trim().to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Substitute every `{{ name }}` in `template` with the percent-encoded value from `variables`.
///
/// A missing, `null` or empty-string value is a hard failure; nothing is substituted
/// partially. Templates without placeholders come back unchanged.
pub fn resolve(template: &str, variables: &IndexMap<String, JsonValue>) -> ConnectorResult<String> {
    if template.is_empty() || !PLACEHOLDER.is_match(template) {
        return Ok(template.to_string());
    }

    let mut substitutions: HashMap<String, String> = HashMap::new();
    let mut resolved = String::with_capacity(template.len());
    let mut last = 0;

    for captures in PLACEHOLDER.captures_iter(template) {
        let whole = captures.get(0).expect("capture 0 is the whole match");
        let name = captures[1].trim();

        if !substitutions.contains_key(name) {
            let encoded = encode_value(name, variables.get(name))?;
            substitutions.insert(name.to_string(), encoded);
        }

        resolved.push_str(&template[last..whole.start()]);
        resolved.push_str(&substitutions[name]);
        last = whole.end();
    }
    resolved.push_str(&template[last..]);

    Ok(resolved)
}

/// Stringify a scalar path value and percent-encode it
fn encode_value(name: &str, value: Option<&JsonValue>) -> ConnectorResult<String> {
    let raw = match value {
        None | Some(JsonValue::Null) => {
            return Err(ConnectorError::MissingPathVariable(name.to_string()))
        }
        Some(JsonValue::String(s)) if s.is_empty() => {
            return Err(ConnectorError::MissingPathVariable(name.to_string()))
        }
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::Bool(b)) => b.to_string(),
        Some(JsonValue::Array(_)) | Some(JsonValue::Object(_)) => {
            return Err(ConnectorError::InvalidInput(format!(
                "Path variable '{}' must be a string, number or boolean",
                name
            )))
        }
    };
    Ok(urlencoding::encode(&raw).into_owned())
}
