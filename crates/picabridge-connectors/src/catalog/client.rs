//! reqwest implementation of [`CatalogGateway`] against the platform REST API

use super::CatalogGateway;
use crate::error::{ConnectorError, ConnectorResult};
use crate::http::url_builder::UrlBuilder;
use async_trait::async_trait;
use picabridge_core::{
    ActionDescriptor, BridgeConfig, ConnectionRef, ConnectorDefinition, SECRET_HEADER,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Rows<T> {
    #[serde(default = "Vec::new")]
    rows: Vec<T>,
}

/// Catalog client for the upstream platform
#[derive(Clone)]
pub struct PicaCatalogClient {
    client: Client,
    base_url: String,
    secret: String,
    page_limit: u32,
}

impl PicaCatalogClient {
    pub fn new(config: &BridgeConfig) -> ConnectorResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
            secret: config.secret.clone(),
            page_limit: config.page_limit,
        })
    }

    /// GET an endpoint returning `{ rows: [...] }`
    async fn get_rows<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ConnectorResult<Vec<T>> {
        let url = UrlBuilder::api(&self.base_url, path);
        debug!("Catalog request GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .header(SECRET_HEADER, &self.secret)
            .query(query)
            .send()
            .await
            .map_err(|e| ConnectorError::upstream(format!("Catalog request to {} failed: {}", path, e), None))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ConnectorError::upstream(format!("Failed to read catalog response: {}", e), None)
        })?;

        if !status.is_success() {
            let payload = if text.is_empty() {
                None
            } else {
                Some(serde_json::from_str(&text).unwrap_or(JsonValue::String(text)))
            };
            return Err(ConnectorError::upstream(
                format!(
                    "Catalog request to {} failed with status code {}",
                    path,
                    status.as_u16()
                ),
                payload,
            ));
        }

        let rows: Rows<T> = serde_json::from_str(&text)?;
        Ok(rows.rows)
    }
}

#[async_trait]
impl CatalogGateway for PicaCatalogClient {
    async fn list_connections(&self) -> ConnectorResult<Vec<ConnectionRef>> {
        self.get_rows("/v1/vault/connections", &[("limit", self.page_limit.to_string())])
            .await
    }

    async fn list_connection_definitions(&self) -> ConnectorResult<Vec<ConnectorDefinition>> {
        self.get_rows("/v1/available-connectors", &[("limit", self.page_limit.to_string())])
            .await
    }

    async fn list_actions_for_platform(
        &self,
        platform: &str,
    ) -> ConnectorResult<Vec<ActionDescriptor>> {
        self.get_rows(
            "/v1/knowledge",
            &[
                ("supported", "true".to_string()),
                ("connectionPlatform", platform.to_string()),
                ("limit", self.page_limit.to_string()),
            ],
        )
        .await
    }

    async fn get_action_by_id(&self, id: &str) -> ConnectorResult<Option<ActionDescriptor>> {
        let rows: Vec<ActionDescriptor> = self
            .get_rows("/v1/knowledge", &[("_id", id.to_string())])
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> PicaCatalogClient {
        let mut config = BridgeConfig::new(server.base_url(), "sk_test");
        config.page_limit = 50;
        PicaCatalogClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_list_connections() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/vault/connections")
                    .query_param("limit", "50")
                    .header("x-pica-secret", "sk_test");
                then.status(200).json_body(json!({
                    "rows": [
                        {"key": "live::gmail::default::1", "platform": "gmail", "active": true},
                        {"key": "live::slack::default::2", "platform": "slack", "active": false}
                    ],
                    "total": 2
                }));
            })
            .await;

        let connections = client(&server).list_connections().await.unwrap();
        mock.assert_async().await;

        assert_eq!(connections.len(), 2);
        assert_eq!(connections[0].platform, "gmail");
        assert!(!connections[1].active);
    }

    #[tokio::test]
    async fn test_list_definitions() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/available-connectors");
                then.status(200).json_body(json!({
                    "rows": [{"platform": "gmail", "name": "Gmail"}]
                }));
            })
            .await;

        let definitions = client(&server).list_connection_definitions().await.unwrap();
        assert_eq!(definitions[0].name, "Gmail");
    }

    #[tokio::test]
    async fn test_list_actions_for_platform() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/knowledge")
                    .query_param("supported", "true")
                    .query_param("connectionPlatform", "gmail")
                    .query_param("limit", "50");
                then.status(200).json_body(json!({
                    "rows": [{
                        "_id": "conn_mod_def::send",
                        "title": "Send Message",
                        "path": "/users/{{userId}}/messages/send",
                        "tags": ["email"]
                    }]
                }));
            })
            .await;

        let actions = client(&server).list_actions_for_platform("gmail").await.unwrap();
        mock.assert_async().await;
        assert_eq!(actions[0].id, "conn_mod_def::send");
        assert_eq!(actions[0].path_template, "/users/{{userId}}/messages/send");
    }

    #[tokio::test]
    async fn test_get_action_by_id_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/knowledge").query_param("_id", "missing");
                then.status(200).json_body(json!({"rows": []}));
            })
            .await;

        let action = client(&server).get_action_by_id("missing").await.unwrap();
        assert!(action.is_none());
    }

    #[tokio::test]
    async fn test_error_status_surfaces_payload() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/vault/connections");
                then.status(401).json_body(json!({"message": "Invalid secret"}));
            })
            .await;

        let err = client(&server).list_connections().await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Invalid secret"));
    }
}
