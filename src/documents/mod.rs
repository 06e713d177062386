//! Document writes
//!
//! Single-document upserts and bulk upserts whose mixed per-item results are
//! reconciled into created / updated / failed lists.

mod bulk;

pub use bulk::{classify_bulk_response, encode_bulk_body};

use crate::core::{BulkReconciliation, Document, IndexError, Result};
use crate::interface::{Method, RequestBody, Transport};
use crate::naming;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a single-document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Created,
    Updated,
}

#[derive(Clone)]
pub struct DocumentWriter {
    transport: Arc<dyn Transport>,
}

impl DocumentWriter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create or overwrite document `id` in `target`.
    pub async fn index_document(
        &self,
        target: &str,
        id: &str,
        body: &JsonValue,
    ) -> Result<WriteResult> {
        naming::validate_index_name(target)?;
        if id.is_empty() {
            return Err(IndexError::Validation("Document id must not be empty".to_string()));
        }

        let path = format!("/{}/_doc/{}", target, urlencoding::encode(id));
        let response = self
            .transport
            .request(Method::Put, &path, Some(RequestBody::Json(body.clone())))
            .await?;

        let created = match response.body.get("created").and_then(JsonValue::as_bool) {
            Some(created) => created,
            None => match response.body.get("result").and_then(JsonValue::as_str) {
                Some(result) => result == "created",
                None => response.status == 201,
            },
        };

        Ok(if created {
            WriteResult::Created
        } else {
            WriteResult::Updated
        })
    }

    /// Upsert `documents` into `target` with one bulk request.
    ///
    /// Per-item failures are returned as data in the reconciliation; only a
    /// failure of the request as a whole is raised.
    pub async fn index_document_bulk(
        &self,
        target: &str,
        documents: &[Document],
    ) -> Result<BulkReconciliation> {
        naming::validate_index_name(target)?;
        if documents.is_empty() {
            return Ok(BulkReconciliation::default());
        }

        let body = encode_bulk_body(target, documents)?;
        let response = self
            .transport
            .request(Method::Post, "/_bulk", Some(RequestBody::NdJson(body)))
            .await?;

        let outcomes = classify_bulk_response(documents, &response.body)?;
        let reconciliation = BulkReconciliation::from_outcomes(outcomes);

        if reconciliation.has_errors() {
            warn!(
                index = target,
                failed = reconciliation.errors.len(),
                total = reconciliation.total(),
                "bulk write had per-document failures"
            );
        } else {
            debug!(index = target, total = reconciliation.total(), "bulk write applied");
        }
        Ok(reconciliation)
    }
}
