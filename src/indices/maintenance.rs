use crate::core::Result;
use crate::interface::{Method, Transport, TransportResponse};
use crate::naming;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Store-side maintenance of single indices.
#[derive(Clone)]
pub struct IndexMaintenance {
    transport: Arc<dyn Transport>,
}

impl IndexMaintenance {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Force-merge `name` down to a single segment.
    ///
    /// The merge may run for minutes. No deadline is applied here; only the
    /// transport's own timeout, if configured, can cut it short. Returns the
    /// store's shard summary.
    pub async fn optimize_index(&self, name: &str) -> Result<TransportResponse> {
        naming::validate_index_name(name)?;

        let started = Instant::now();
        let response = self
            .transport
            .request(
                Method::Post,
                &format!("/{}/_forcemerge?max_num_segments=1", name),
                None,
            )
            .await?;

        info!(
            index = name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "force-merge finished"
        );
        Ok(response)
    }

    /// Make recent writes to `name` visible to search.
    pub async fn refresh_index(&self, name: &str) -> Result<()> {
        naming::validate_index_name(name)?;

        self.transport
            .request(Method::Post, &format!("/{}/_refresh", name), None)
            .await?;
        Ok(())
    }
}
