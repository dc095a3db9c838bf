//! Dual-mode dispatch: execute an action now, or generate a reviewable request

use super::assembler::{assemble, AssemblyParts};
use super::body_builder::BodyBuilder;
use super::codegen::{render_curl, secret_instructions};
use super::executor::HttpExecutor;
use super::partitioner::partition;
use crate::catalog::{CatalogStore, ConnectionLookup};
use crate::error::{ConnectorError, ConnectorResult};
use picabridge_core::{
    header_names, redact_secret, redact_secret_in_json, BridgeConfig, EncodedBody,
    InvocationRequest, RequestDescriptor,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request summary returned alongside a live response; header values are never included
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEcho {
    pub method: String,
    pub path: String,
    pub url: String,
    pub header_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteOutcome {
    pub data: JsonValue,
    pub status_code: u16,
    pub execution_time_ms: u64,
    pub request: RequestEcho,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutcome {
    pub platform: String,
    /// Descriptor with the secret replaced by the environment placeholder
    pub request: RequestDescriptor,
    pub code: String,
    pub instructions: String,
}

/// Turns invocation requests into passthrough requests and either sends or renders them
pub struct ActionDispatcher {
    base_url: String,
    secret: String,
    catalog: Arc<CatalogStore>,
    executor: HttpExecutor,
}

impl ActionDispatcher {
    pub fn new(config: &BridgeConfig, catalog: Arc<CatalogStore>) -> ConnectorResult<Self> {
        config.validate()?;
        Ok(Self {
            base_url: config.normalized_base_url().to_string(),
            secret: config.secret.clone(),
            catalog,
            executor: HttpExecutor::new(config.connect_timeout())?,
        })
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    /// Validate, partition, encode and assemble. Pure; touches neither network nor cache.
    pub fn build_request(
        &self,
        request: &InvocationRequest,
    ) -> ConnectorResult<(RequestDescriptor, String)> {
        validate(request)?;

        let partitioned = partition(
            &request.path,
            request.data.clone(),
            request.path_variables.as_ref(),
        )?;
        let built = BodyBuilder::build(partitioned.data.as_ref(), request.body_mode());

        let descriptor = assemble(AssemblyParts {
            base_url: &self.base_url,
            resolved_path: &partitioned.resolved_path,
            method: &request.method,
            connection_key: &request.connection_key,
            action_id: &request.action_id,
            secret: &self.secret,
            explicit_headers: request.headers.as_ref(),
            query_params: request.query_params.as_ref(),
            body: built,
        })?;

        Ok((descriptor, partitioned.resolved_path))
    }

    /// Send the request and return the upstream payload verbatim
    pub async fn execute(&self, request: InvocationRequest) -> ConnectorResult<ExecuteOutcome> {
        info!(
            "Executing action {} via connection {}",
            request.action_id, request.connection_key
        );

        match self.catalog.find_connection(&request.connection_key).await {
            ConnectionLookup::Found(_) => {}
            ConnectionLookup::Missing => {
                return Err(ConnectorError::UnknownConnection {
                    key: request.connection_key.clone(),
                    platform: None,
                })
            }
            ConnectionLookup::Unverifiable => warn!(
                "Connection list unavailable, sending action {} without verifying connection",
                request.action_id
            ),
        }

        let (descriptor, path) = self.build_request(&request)?;
        let result = self.executor.execute(&descriptor).await?;

        debug!("Action {} returned {}", request.action_id, result.status_code);

        Ok(ExecuteOutcome {
            data: result.body,
            status_code: result.status_code,
            execution_time_ms: result.execution_time_ms,
            request: RequestEcho {
                method: descriptor.method.clone(),
                path,
                url: descriptor.url.clone(),
                header_names: header_names(&descriptor.headers),
            },
        })
    }

    /// Build the request without sending it and render a code sample that reads the
    /// secret from the environment
    pub async fn generate(
        &self,
        platform: &str,
        request: InvocationRequest,
    ) -> ConnectorResult<GenerateOutcome> {
        info!(
            "Generating request for action {} on platform {}",
            request.action_id, platform
        );

        match self.catalog.find_connection(&request.connection_key).await {
            ConnectionLookup::Found(_) => {}
            ConnectionLookup::Missing | ConnectionLookup::Unverifiable => {
                return Err(ConnectorError::UnknownConnection {
                    key: request.connection_key.clone(),
                    platform: Some(platform.to_string()),
                })
            }
        }

        let (descriptor, _) = self.build_request(&request)?;
        let masked = self.scrub_descriptor(descriptor.with_masked_secret());
        let code = redact_secret(&render_curl(&masked)?, &self.secret);

        Ok(GenerateOutcome {
            platform: platform.to_string(),
            request: masked,
            code,
            instructions: secret_instructions(),
        })
    }

    /// Remove any literal copy of the secret the caller may have placed in the request.
    /// Only values are rewritten; the descriptor's own structure is left alone.
    fn scrub_descriptor(&self, mut descriptor: RequestDescriptor) -> RequestDescriptor {
        let secret = self.secret.as_str();
        if secret.is_empty() {
            return descriptor;
        }

        descriptor.url = redact_secret(&descriptor.url, secret);
        for value in descriptor.headers.values_mut() {
            *value = redact_secret(value, secret);
        }
        for value in descriptor.params.values_mut() {
            redact_secret_in_json(value, secret);
        }
        match descriptor.body.as_mut() {
            None => {}
            Some(EncodedBody::Json(value)) => redact_secret_in_json(value, secret),
            Some(EncodedBody::UrlEncoded(encoded)) => *encoded = redact_secret(encoded, secret),
            Some(EncodedBody::Multipart(fields)) => {
                for field in fields {
                    field.name = redact_secret(&field.name, secret);
                    field.value = redact_secret(&field.value, secret);
                }
            }
        }
        descriptor
    }
}

fn validate(request: &InvocationRequest) -> ConnectorResult<()> {
    if request.action_id.trim().is_empty() {
        return Err(ConnectorError::InvalidInput("actionId is required".to_string()));
    }
    if request.connection_key.trim().is_empty() {
        return Err(ConnectorError::InvalidInput("connectionKey is required".to_string()));
    }
    Ok(())
}
