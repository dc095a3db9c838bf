//! Splits a caller payload into path variables and request body

use super::path_template;
use crate::error::{ConnectorError, ConnectorResult};
use indexmap::IndexMap;
use picabridge_core::Payload;
use serde_json::Value as JsonValue;

/// Result of partitioning a payload against a path template
#[derive(Debug, Clone, PartialEq)]
pub struct Partitioned {
    pub resolved_path: String,
    /// Payload with promoted fields removed
    pub data: Option<Payload>,
    pub path_variables: IndexMap<String, JsonValue>,
}

/// Promote payload fields named by the template into path variables and resolve the path.
///
/// Explicit path variables win over payload fields of the same name. Fields found only in a
/// record payload are moved out of it so they are not sent twice. List and scalar payloads
/// are never mined for path variables.
pub fn partition(
    path_template: &str,
    data: Option<Payload>,
    explicit_path_variables: Option<&IndexMap<String, JsonValue>>,
) -> ConnectorResult<Partitioned> {
    let required = path_template::required_variables(path_template);
    let mut path_variables: IndexMap<String, JsonValue> =
        explicit_path_variables.cloned().unwrap_or_default();

    let mut data = data;

    let missing: Vec<String> = required
        .iter()
        .filter(|name| {
            !path_variables.contains_key(name.as_str())
                && !data
                    .as_ref()
                    .and_then(Payload::as_record)
                    .map(|record| record.contains_key(name.as_str()))
                    .unwrap_or(false)
        })
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(ConnectorError::MissingPathVariables(missing));
    }

    if let Some(Payload::Record(record)) = data.as_mut() {
        for name in &required {
            if path_variables.contains_key(name) {
                continue;
            }
            if let Some(value) = record.shift_remove(name) {
                path_variables.insert(name.clone(), value);
            }
        }
    }

    let resolved_path = path_template::resolve(path_template, &path_variables)?;

    Ok(Partitioned {
        resolved_path,
        data,
        path_variables,
    })
}
