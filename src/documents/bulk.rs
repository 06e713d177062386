//! Bulk request encoding and per-item result classification.

use crate::core::{BulkItemError, BulkItemOutcome, Document, IndexError, Result};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

#[derive(Debug, Deserialize)]
struct BulkResponse {
    items: Vec<serde_json::Map<String, JsonValue>>,
}

#[derive(Debug, Default, Deserialize)]
struct BulkResponseItem {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    created: Option<bool>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<JsonValue>,
}

impl BulkResponseItem {
    /// Prefers the explicit `created` flag, then `result`, then the 201 status.
    fn was_created(&self) -> bool {
        if let Some(created) = self.created {
            return created;
        }
        if let Some(result) = &self.result {
            return result == "created";
        }
        self.status == Some(201)
    }
}

/// Encodes `documents` as alternating action and source lines, each
/// newline-terminated, in input order.
pub fn encode_bulk_body(target: &str, documents: &[Document]) -> Result<String> {
    let mut body = String::new();
    for document in documents {
        let action = json!({ "index": { "_index": target, "_id": document.id } });
        body.push_str(&action.to_string());
        body.push('\n');
        body.push_str(&serde_json::to_string(&document.body)?);
        body.push('\n');
    }
    Ok(body)
}

/// Pairs each response item with the document submitted at the same position.
pub fn classify_bulk_response(
    documents: &[Document],
    response: &JsonValue,
) -> Result<Vec<BulkItemOutcome>> {
    let parsed = BulkResponse::deserialize(response)?;

    if parsed.items.len() != documents.len() {
        return Err(IndexError::UnexpectedResponse(format!(
            "bulk response has {} items for {} documents",
            parsed.items.len(),
            documents.len()
        )));
    }

    documents
        .iter()
        .zip(parsed.items)
        .map(|(document, item)| -> Result<BulkItemOutcome> {
            let detail = match item.into_iter().next() {
                Some((_, detail)) => BulkResponseItem::deserialize(detail)?,
                None => BulkResponseItem::default(),
            };
            let id = document.id.clone();

            Ok(match detail.error {
                Some(error) => BulkItemOutcome::Failed {
                    id,
                    error: to_item_error(error)?,
                },
                None if detail.was_created() => BulkItemOutcome::Created { id },
                None => BulkItemOutcome::Updated { id },
            })
        })
        .collect()
}

/// Very old stores report item errors as a bare string. Anything that does not
/// fit the structured shape is kept verbatim under `raw`.
fn to_item_error(error: JsonValue) -> Result<BulkItemError> {
    let untyped = |reason: Option<String>, extra: serde_json::Map<String, JsonValue>| BulkItemError {
        error_type: BulkItemError::UNTYPED.to_string(),
        reason,
        caused_by: None,
        extra,
    };

    match error {
        JsonValue::String(reason) => Ok(untyped(Some(reason), Default::default())),
        other => {
            if let Ok(error) = BulkItemError::deserialize(&other) {
                return Ok(error);
            }
            let mut extra = serde_json::Map::new();
            extra.insert("raw".to_string(), other);
            Ok(untyped(None, extra))
        }
    }
}
