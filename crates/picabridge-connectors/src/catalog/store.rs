//! Owned cache of the connection and connector-definition lists

use super::CatalogGateway;
use crate::error::{ConnectorError, ConnectorResult};
use chrono::{DateTime, Utc};
use picabridge_core::{ActionDescriptor, ConnectionRef, ConnectorDefinition};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Point-in-time copy of the cached catalog lists
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub connections: Vec<ConnectionRef>,
    pub definitions: Vec<ConnectorDefinition>,
    pub fetched_at: DateTime<Utc>,
    /// The connection fetch failed and `connections` is an empty stand-in
    pub connections_degraded: bool,
    /// The definitions fetch failed and `definitions` is an empty stand-in
    pub definitions_degraded: bool,
}

impl CatalogSnapshot {
    pub fn is_degraded(&self) -> bool {
        self.connections_degraded || self.definitions_degraded
    }

    pub fn find_connection(&self, key: &str) -> Option<&ConnectionRef> {
        self.connections.iter().find(|c| c.key == key)
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        Utc::now()
            .signed_duration_since(self.fetched_at)
            .to_std()
            .map(|age| age >= ttl)
            .unwrap_or(false)
    }
}

/// Outcome of looking a connection key up in the cache
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionLookup {
    Found(ConnectionRef),
    Missing,
    /// The connection list could not be fetched, so absence proves nothing
    Unverifiable,
}

/// Cache in front of a [`CatalogGateway`], refreshed on demand or after a TTL
pub struct CatalogStore {
    gateway: Arc<dyn CatalogGateway>,
    ttl: Duration,
    current: RwLock<Option<Arc<CatalogSnapshot>>>,
    refresh_lock: Mutex<()>,
}

impl CatalogStore {
    pub fn new(gateway: Arc<dyn CatalogGateway>, ttl: Duration) -> Self {
        Self {
            gateway,
            ttl,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn CatalogGateway> {
        &self.gateway
    }

    /// Current snapshot, fetched first if missing or older than the TTL
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        if let Some(snapshot) = self.fresh_snapshot().await {
            return snapshot;
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited
        if let Some(snapshot) = self.fresh_snapshot().await {
            return snapshot;
        }
        self.fetch_and_store().await
    }

    /// Refetch both lists regardless of age
    pub async fn refresh(&self) -> Arc<CatalogSnapshot> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_and_store().await
    }

    /// Look a connection up, forcing one refresh on a miss before reporting it absent
    pub async fn find_connection(&self, key: &str) -> ConnectionLookup {
        let snapshot = self.snapshot().await;
        if let Some(found) = snapshot.find_connection(key) {
            return ConnectionLookup::Found(found.clone());
        }

        debug!("Connection '{}' not cached, refreshing catalog", key);
        let snapshot = self.refresh().await;
        match snapshot.find_connection(key) {
            Some(found) => ConnectionLookup::Found(found.clone()),
            None if snapshot.connections_degraded => ConnectionLookup::Unverifiable,
            None => ConnectionLookup::Missing,
        }
    }

    /// Actions are not cached; each call goes to the gateway
    pub async fn list_actions_for_platform(
        &self,
        platform: &str,
    ) -> ConnectorResult<Vec<ActionDescriptor>> {
        self.gateway.list_actions_for_platform(platform).await
    }

    pub async fn get_action_by_id(&self, id: &str) -> ConnectorResult<ActionDescriptor> {
        self.gateway
            .get_action_by_id(id)
            .await?
            .ok_or_else(|| ConnectorError::ActionNotFound(id.to_string()))
    }

    async fn fresh_snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        let current = self.current.read().await;
        current
            .as_ref()
            .filter(|snapshot| !snapshot.is_stale(self.ttl))
            .cloned()
    }

    async fn fetch_and_store(&self) -> Arc<CatalogSnapshot> {
        let (connections, definitions) = tokio::join!(
            self.gateway.list_connections(),
            self.gateway.list_connection_definitions()
        );

        let mut connections_degraded = false;
        let mut definitions_degraded = false;
        let connections = connections.unwrap_or_else(|e| {
            connections_degraded = true;
            warn!("{}", ConnectorError::CatalogUnavailable(format!("connections: {}", e)));
            Vec::new()
        });
        let definitions = definitions.unwrap_or_else(|e| {
            definitions_degraded = true;
            warn!("{}", ConnectorError::CatalogUnavailable(format!("connector definitions: {}", e)));
            Vec::new()
        });

        info!(
            "Catalog refreshed: {} connections, {} connector definitions{}",
            connections.len(),
            definitions.len(),
            if connections_degraded || definitions_degraded {
                " (degraded)"
            } else {
                ""
            }
        );

        let snapshot = Arc::new(CatalogSnapshot {
            connections,
            definitions,
            fetched_at: Utc::now(),
            connections_degraded,
            definitions_degraded,
        });
        *self.current.write().await = Some(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory gateway used across the crate's tests
    #[derive(Default)]
    pub(crate) struct StaticGateway {
        pub connections: std::sync::Mutex<Vec<ConnectionRef>>,
        pub actions: Vec<ActionDescriptor>,
        pub fail_connections: bool,
        pub fail_definitions: bool,
        pub connection_calls: AtomicUsize,
    }

    impl StaticGateway {
        pub(crate) fn with_connections(connections: Vec<ConnectionRef>) -> Self {
            Self {
                connections: std::sync::Mutex::new(connections),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl CatalogGateway for StaticGateway {
        async fn list_connections(&self) -> ConnectorResult<Vec<ConnectionRef>> {
            self.connection_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_connections {
                return Err(ConnectorError::upstream("vault offline", None));
            }
            Ok(self.connections.lock().unwrap().clone())
        }

        async fn list_connection_definitions(&self) -> ConnectorResult<Vec<ConnectorDefinition>> {
            if self.fail_definitions {
                return Err(ConnectorError::upstream("definitions offline", None));
            }
            Ok(vec![ConnectorDefinition {
                platform: "gmail".into(),
                name: "Gmail".into(),
                description: None,
            }])
        }

        async fn list_actions_for_platform(
            &self,
            platform: &str,
        ) -> ConnectorResult<Vec<ActionDescriptor>> {
            Ok(self
                .actions
                .iter()
                .filter(|a| a.platform.as_deref() == Some(platform))
                .cloned()
                .collect())
        }

        async fn get_action_by_id(&self, id: &str) -> ConnectorResult<Option<ActionDescriptor>> {
            Ok(self.actions.iter().find(|a| a.id == id).cloned())
        }
    }

    pub(crate) fn connection(key: &str, platform: &str) -> ConnectionRef {
        ConnectionRef {
            key: key.into(),
            platform: platform.into(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_snapshot_is_cached_within_ttl() {
        let gateway = Arc::new(StaticGateway::with_connections(vec![connection("k1", "gmail")]));
        let store = CatalogStore::new(gateway.clone(), Duration::from_secs(60));

        let first = store.snapshot().await;
        let second = store.snapshot().await;

        assert_eq!(first.connections.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gateway.connection_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_refetches() {
        let gateway = Arc::new(StaticGateway::default());
        let store = CatalogStore::new(gateway.clone(), Duration::ZERO);

        store.snapshot().await;
        store.snapshot().await;
        assert_eq!(gateway.connection_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_find_connection_refreshes_on_miss() {
        let gateway = Arc::new(StaticGateway::default());
        let store = CatalogStore::new(gateway.clone(), Duration::from_secs(60));
        store.snapshot().await;

        gateway
            .connections
            .lock()
            .unwrap()
            .push(connection("late", "slack"));

        let lookup = store.find_connection("late").await;
        assert_eq!(lookup, ConnectionLookup::Found(connection("late", "slack")));
        assert_eq!(store.find_connection("never").await, ConnectionLookup::Missing);
    }

    #[tokio::test]
    async fn test_degraded_snapshot_on_fetch_failure() {
        let gateway = Arc::new(StaticGateway {
            fail_connections: true,
            fail_definitions: true,
            ..StaticGateway::default()
        });
        let store = CatalogStore::new(gateway, Duration::from_secs(60));

        let snapshot = store.snapshot().await;
        assert!(snapshot.is_degraded());
        assert!(snapshot.connections_degraded);
        assert!(snapshot.connections.is_empty());
        assert!(snapshot.definitions.is_empty());
        assert_eq!(store.find_connection("k").await, ConnectionLookup::Unverifiable);
    }

    #[tokio::test]
    async fn test_definitions_failure_keeps_connections() {
        let gateway = Arc::new(StaticGateway {
            fail_definitions: true,
            ..StaticGateway::with_connections(vec![connection("k1", "gmail")])
        });
        let store = CatalogStore::new(gateway, Duration::from_secs(60));

        let snapshot = store.snapshot().await;
        assert!(snapshot.is_degraded());
        assert!(!snapshot.connections_degraded);
        assert_eq!(snapshot.connections.len(), 1);
        assert!(snapshot.definitions.is_empty());
    }

    #[tokio::test]
    async fn test_definitions_failure_still_reports_missing_connection() {
        let gateway = Arc::new(StaticGateway {
            fail_definitions: true,
            ..StaticGateway::default()
        });
        let store = CatalogStore::new(gateway, Duration::from_secs(60));

        assert!(store.snapshot().await.definitions_degraded);
        assert_eq!(store.find_connection("never-stored").await, ConnectionLookup::Missing);
    }

    #[tokio::test]
    async fn test_get_action_by_id_not_found() {
        let store = CatalogStore::new(Arc::new(StaticGateway::default()), Duration::from_secs(60));
        let err = store.get_action_by_id("nope").await.unwrap_err();
        assert!(matches!(err, ConnectorError::ActionNotFound(_)));
    }
}
