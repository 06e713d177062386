use super::discovery::IndexDiscovery;
use crate::core::{AliasAction, AliasUpdate, IndexError, Result};
use crate::interface::{Method, RequestBody, Transport};
use crate::naming;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Repoints aliases through single atomic `_aliases` submissions.
///
/// The read-then-write in `set_alias_to_single_index` is not atomic as a
/// whole; concurrent callers on the same alias must be serialized by the
/// caller.
#[derive(Clone)]
pub struct AliasCoordinator {
    transport: Arc<dyn Transport>,
    discovery: IndexDiscovery,
}

impl AliasCoordinator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let discovery = IndexDiscovery::new(Arc::clone(&transport));
        Self {
            transport,
            discovery,
        }
    }

    /// Submit the adds and removes of `update` for `alias` as one request.
    ///
    /// Validation runs before anything is sent.
    pub async fn update_alias(&self, alias: &str, update: &AliasUpdate) -> Result<()> {
        naming::validate_index_name(alias)?;
        let actions = update.actions(alias)?;
        self.submit(&actions).await
    }

    /// Submit a prebuilt action list atomically.
    pub async fn submit(&self, actions: &[AliasAction]) -> Result<()> {
        if actions.is_empty() {
            return Err(IndexError::Validation(
                "You must add or remove at least one index".to_string(),
            ));
        }

        let body = json!({ "actions": actions });
        let response = self
            .transport
            .request(Method::Post, "/_aliases", Some(RequestBody::Json(body)))
            .await?;

        if !response.acknowledged() {
            return Err(IndexError::NotAcknowledged("alias update".to_string()));
        }
        Ok(())
    }

    /// Point `alias` at `new_index` and nothing else, in one atomic swap.
    pub async fn set_alias_to_single_index(&self, alias: &str, new_index: &str) -> Result<()> {
        naming::validate_index_name(alias)?;
        naming::validate_index_name(new_index)?;

        // Removing the target itself would undo the add in the same request.
        let stale: Vec<String> = self
            .discovery
            .indices_for_alias(alias)
            .await?
            .into_iter()
            .filter(|index| index != new_index)
            .collect();

        let update = if stale.is_empty() {
            AliasUpdate::new().add(new_index)
        } else {
            AliasUpdate::new().add(new_index).remove(stale.clone())
        };
        self.update_alias(alias, &update).await?;

        info!(alias, index = new_index, previous = ?stale, "alias repointed");
        Ok(())
    }
}
