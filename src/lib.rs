// ============================================================================
// indexkeeper Library
// ============================================================================

pub mod core;
pub mod interface;
pub mod connection;
pub mod naming;
pub mod indices;
pub mod documents;

// Re-export main types for convenience
pub use crate::core::{
    AliasAction, AliasUpdate, BulkFailure, BulkItemError, BulkItemOutcome, BulkReconciliation,
    Document, IndexError, IndexSelection, Result,
};
pub use interface::{Method, RequestBody, Transport, TransportResponse};
pub use connection::{
    HttpTransport,
    config::ConnectionConfig,
    memory::{InMemoryTransport, RecordedRequest},
};
pub use indices::{
    AliasCoordinator, IndexDiscovery, IndexMaintenance, IndexProvisioner, RetentionSweeper,
};
pub use documents::{DocumentWriter, WriteResult};

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// High-level API
// ============================================================================

/// Index lifecycle manager bound to one store
///
/// Holds the store handle and one instance of every component, all sharing
/// the same transport. Nothing about indices or aliases is cached between
/// calls.
///
/// # Examples
///
/// ```no_run
/// use indexkeeper::IndexManager;
/// use serde_json::json;
///
/// # async fn run() -> indexkeeper::Result<()> {
/// let manager = IndexManager::connect("http://localhost:9200")?;
///
/// // Build a fresh index and swap the alias over in one atomic step
/// let index = manager.rotate("products", &json!({}), &json!({})).await?;
///
/// // Drop unaliased indices older than the retention window
/// manager.cleanup_old_indices("products", None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct IndexManager {
    transport: Arc<dyn Transport>,
    provisioner: IndexProvisioner,
    discovery: IndexDiscovery,
    aliases: AliasCoordinator,
    sweeper: RetentionSweeper,
    maintenance: IndexMaintenance,
    documents: DocumentWriter,
}

impl IndexManager {
    /// Connect over HTTP with default configuration
    pub fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(ConnectionConfig::from_url(url).map_err(IndexError::Validation)?)
    }

    /// Connect over HTTP with custom configuration
    ///
    /// # Examples
    ///
    /// ```
    /// # use indexkeeper::{IndexManager, ConnectionConfig};
    /// # use std::time::Duration;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ConnectionConfig::new("http://localhost:9200")
    ///     .basic_auth("elastic", "changeme")
    ///     .request_timeout(Duration::from_secs(900))
    ///     .retention_days(30);
    ///
    /// let manager = IndexManager::connect_with_config(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn connect_with_config(config: ConnectionConfig) -> Result<Self> {
        let retention_days = config.retention_days;
        let transport = HttpTransport::new(config)?;
        Self::with_transport(Arc::new(transport)).retention_days(retention_days)
    }

    /// Connect using `INDEXKEEPER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::connect_with_config(ConnectionConfig::from_env().map_err(IndexError::Validation)?)
    }

    /// Build on any transport, e.g. `InMemoryTransport` in tests
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            provisioner: IndexProvisioner::new(Arc::clone(&transport)),
            discovery: IndexDiscovery::new(Arc::clone(&transport)),
            aliases: AliasCoordinator::new(Arc::clone(&transport)),
            sweeper: RetentionSweeper::new(Arc::clone(&transport)),
            maintenance: IndexMaintenance::new(Arc::clone(&transport)),
            documents: DocumentWriter::new(Arc::clone(&transport)),
            transport,
        }
    }

    /// Set the retention window used when no cutoff is passed
    ///
    /// Zero is rejected, same as `ConnectionConfig::validate`.
    pub fn retention_days(mut self, days: u32) -> Result<Self> {
        if days == 0 {
            return Err(IndexError::Validation(
                "retention_days must be > 0".to_string(),
            ));
        }
        self.sweeper = self.sweeper.with_retention_days(days);
        Ok(self)
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn provisioner(&self) -> &IndexProvisioner {
        &self.provisioner
    }

    pub fn discovery(&self) -> &IndexDiscovery {
        &self.discovery
    }

    pub fn aliases(&self) -> &AliasCoordinator {
        &self.aliases
    }

    pub fn sweeper(&self) -> &RetentionSweeper {
        &self.sweeper
    }

    pub fn maintenance(&self) -> &IndexMaintenance {
        &self.maintenance
    }

    pub fn documents(&self) -> &DocumentWriter {
        &self.documents
    }

    /// Check that the store answers
    pub async fn ping(&self) -> Result<()> {
        self.transport.ping().await
    }

    pub async fn create_index(
        &self,
        name: &str,
        mappings: &JsonValue,
        settings: &JsonValue,
    ) -> Result<()> {
        self.provisioner.create_index(name, mappings, settings).await
    }

    pub async fn create_timestamped_index(
        &self,
        alias: &str,
        mappings: &JsonValue,
        settings: &JsonValue,
    ) -> Result<String> {
        self.provisioner
            .create_timestamped_index(alias, mappings, settings)
            .await
    }

    pub async fn delete_index(&self, name: &str) -> Result<()> {
        self.provisioner.delete_index(name).await
    }

    pub async fn index_exists(&self, name: &str) -> Result<bool> {
        self.provisioner.index_exists(name).await
    }

    pub async fn optimize_index(&self, name: &str) -> Result<TransportResponse> {
        self.maintenance.optimize_index(name).await
    }

    pub async fn refresh_index(&self, name: &str) -> Result<()> {
        self.maintenance.refresh_index(name).await
    }

    pub async fn indices_older_than(
        &self,
        alias_prefix: &str,
        cutoff_epoch_millis: i64,
    ) -> Result<Vec<String>> {
        self.discovery
            .indices_older_than(alias_prefix, cutoff_epoch_millis)
            .await
    }

    pub async fn indices_for_alias(&self, alias: &str) -> Result<Vec<String>> {
        self.discovery.indices_for_alias(alias).await
    }

    pub async fn update_alias(&self, alias: &str, update: &AliasUpdate) -> Result<()> {
        self.aliases.update_alias(alias, update).await
    }

    pub async fn set_alias_to_single_index(&self, alias: &str, new_index: &str) -> Result<()> {
        self.aliases.set_alias_to_single_index(alias, new_index).await
    }

    pub async fn cleanup_old_indices(
        &self,
        alias: &str,
        cutoff_epoch_millis: Option<i64>,
    ) -> Result<Vec<String>> {
        self.sweeper
            .cleanup_old_indices(alias, cutoff_epoch_millis)
            .await
    }

    pub async fn index_document(
        &self,
        target: &str,
        id: &str,
        body: &JsonValue,
    ) -> Result<WriteResult> {
        self.documents.index_document(target, id, body).await
    }

    pub async fn index_document_bulk(
        &self,
        target: &str,
        documents: &[Document],
    ) -> Result<BulkReconciliation> {
        self.documents.index_document_bulk(target, documents).await
    }

    /// Create a timestamped index and point `alias` at it alone
    ///
    /// If the alias swap fails the new index is left in place and the error
    /// is returned; the alias keeps its previous bindings.
    pub async fn rotate(
        &self,
        alias: &str,
        mappings: &JsonValue,
        settings: &JsonValue,
    ) -> Result<String> {
        self.rotate_at(alias, mappings, settings, Utc::now()).await
    }

    /// `rotate` with the new index stamped at `at`
    pub async fn rotate_at(
        &self,
        alias: &str,
        mappings: &JsonValue,
        settings: &JsonValue,
        at: DateTime<Utc>,
    ) -> Result<String> {
        let index = self
            .provisioner
            .create_timestamped_index_at(alias, mappings, settings, at)
            .await?;
        self.aliases.set_alias_to_single_index(alias, &index).await?;

        info!(alias, index = %index, "rotated alias onto new index");
        Ok(index)
    }
}
