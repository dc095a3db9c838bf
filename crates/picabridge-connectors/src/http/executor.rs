use super::assembler::normalize_method;
use super::url_builder::UrlBuilder;
use crate::error::{ConnectorError, ConnectorResult};
use picabridge_core::{mask_headers, EncodedBody, RequestDescriptor};
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tracing::debug;

/// HTTP executor that sends assembled passthrough requests
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
}

/// Execution result containing response data
#[derive(Debug, Clone)]
pub struct HttpExecutionResult {
    pub status_code: u16,
    pub body: JsonValue,
    pub execution_time_ms: u64,
}

impl HttpExecutor {
    pub fn new(connect_timeout: Duration) -> ConnectorResult<Self> {
        let client = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self { client })
    }

    /// Send the request once. Non-2xx responses become `UpstreamRequestFailed` carrying
    /// the response body; there is no retry.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> ConnectorResult<HttpExecutionResult> {
        let start_time = Instant::now();
        let method = normalize_method(&descriptor.method)?;
        UrlBuilder::validate(&descriptor.url)?;

        debug!(
            "Sending {} {} headers={:?}",
            method,
            descriptor.url,
            mask_headers(&descriptor.headers)
        );

        let mut request_builder = self
            .client
            .request(method, &descriptor.url)
            .query(&UrlBuilder::query_pairs(&descriptor.params));

        let is_multipart = matches!(descriptor.body, Some(EncodedBody::Multipart(_)));
        for (name, value) in &descriptor.headers {
            // reqwest writes the multipart content type with its own boundary
            if is_multipart && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            request_builder = request_builder.header(name, value);
        }

        request_builder = match &descriptor.body {
            None => request_builder,
            Some(EncodedBody::Json(value)) => request_builder.body(serde_json::to_vec(value)?),
            Some(EncodedBody::UrlEncoded(encoded)) => request_builder.body(encoded.clone()),
            Some(EncodedBody::Multipart(fields)) => {
                let form = fields.iter().fold(Form::new(), |form, field| {
                    form.text(field.name.clone(), field.value.clone())
                });
                request_builder.multipart(form)
            }
        };

        let response = request_builder
            .send()
            .await
            .map_err(|e| ConnectorError::upstream(format!("Request failed: {}", e), None))?;

        self.process_response(response, start_time).await
    }

    /// Process the HTTP response
    async fn process_response(
        &self,
        response: Response,
        start_time: Instant,
    ) -> ConnectorResult<HttpExecutionResult> {
        let status = response.status();
        let status_code = status.as_u16();

        let body_text = response.text().await.map_err(|e| {
            ConnectorError::upstream(format!("Failed to read response body: {}", e), None)
        })?;
        let body: JsonValue = if body_text.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_str(&body_text).unwrap_or(JsonValue::String(body_text))
        };

        if !status.is_success() {
            let payload = if body.is_null() { None } else { Some(body) };
            return Err(ConnectorError::upstream(
                format!("Request failed with status code {}", status_code),
                payload,
            ));
        }

        let execution_time_ms = start_time.elapsed().as_millis() as u64;
        debug!("Upstream responded {} in {}ms", status_code, execution_time_ms);

        Ok(HttpExecutionResult {
            status_code,
            body,
            execution_time_ms,
        })
    }
}
