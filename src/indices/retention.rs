use super::discovery::IndexDiscovery;
use super::provisioner::IndexProvisioner;
use crate::connection::config::DEFAULT_RETENTION_DAYS;
use crate::core::{IndexError, Result};
use crate::interface::Transport;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Deletes indices that aged out of the retention window, sparing anything
/// the alias still points at.
#[derive(Clone)]
pub struct RetentionSweeper {
    discovery: IndexDiscovery,
    provisioner: IndexProvisioner,
    retention_days: u32,
}

impl RetentionSweeper {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            discovery: IndexDiscovery::new(Arc::clone(&transport)),
            provisioner: IndexProvisioner::new(transport),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Cutoff used when none is given: now minus the retention window.
    ///
    /// A zero-day window would put every unaliased index past the cutoff, so
    /// it is refused.
    pub fn default_cutoff(&self) -> Result<i64> {
        if self.retention_days == 0 {
            return Err(IndexError::Validation(
                "retention_days must be > 0".to_string(),
            ));
        }
        Ok((Utc::now() - Duration::days(i64::from(self.retention_days))).timestamp_millis())
    }

    /// Delete every `<alias>*` index created before the cutoff that the alias
    /// does not reference, newest first.
    ///
    /// Alias bindings are re-read on every call. A failed delete does not stop
    /// the sweep; remaining candidates are still attempted and the failures
    /// come back together as `IndexError::Cleanup`. Returns the deleted names
    /// in deletion order.
    pub async fn cleanup_old_indices(
        &self,
        alias: &str,
        cutoff_epoch_millis: Option<i64>,
    ) -> Result<Vec<String>> {
        let cutoff = match cutoff_epoch_millis {
            Some(cutoff) => cutoff,
            None => self.default_cutoff()?,
        };

        let candidates = self.discovery.indices_older_than(alias, cutoff).await?;
        let protected = self.discovery.indices_for_alias(alias).await?;

        let to_delete: Vec<String> = candidates
            .into_iter()
            .filter(|index| !protected.contains(index))
            .collect();

        let mut deleted = Vec::with_capacity(to_delete.len());
        let mut failures = Vec::new();
        for index in to_delete {
            match self.provisioner.delete_index(&index).await {
                Ok(()) => deleted.push(index),
                Err(e) => {
                    warn!(alias, index = %index, error = %e, "failed to delete aged index");
                    failures.push((index, e));
                }
            }
        }

        info!(
            alias,
            cutoff_epoch_millis = cutoff,
            deleted = deleted.len(),
            failed = failures.len(),
            protected = ?protected,
            "retention sweep finished"
        );

        if failures.is_empty() {
            Ok(deleted)
        } else {
            Err(IndexError::Cleanup { deleted, failures })
        }
    }
}
