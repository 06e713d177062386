use crate::core::{IndexError, Result};
use crate::interface::{Method, Transport};
use crate::naming;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

const CREATION_DATE_POINTER: &str = "/settings/index/creation_date";

/// Read-only queries over index ages and alias bindings.
///
/// Nothing is cached: every call asks the store again.
#[derive(Clone)]
pub struct IndexDiscovery {
    transport: Arc<dyn Transport>,
}

impl IndexDiscovery {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Indices matching `<alias_prefix>*` created strictly before
    /// `cutoff_epoch_millis`, newest first.
    pub async fn indices_older_than(
        &self,
        alias_prefix: &str,
        cutoff_epoch_millis: i64,
    ) -> Result<Vec<String>> {
        let mut aged = self.creation_dates(alias_prefix).await?;
        aged.retain(|(_, created)| *created < cutoff_epoch_millis);
        aged.sort_by(|(a_name, a_created), (b_name, b_created)| {
            b_created.cmp(a_created).then_with(|| a_name.cmp(b_name))
        });

        debug!(
            prefix = alias_prefix,
            cutoff_epoch_millis,
            found = aged.len(),
            "indices older than cutoff"
        );
        Ok(aged.into_iter().map(|(name, _)| name).collect())
    }

    /// Creation time (epoch millis) of every index matching `<alias_prefix>*`.
    pub async fn creation_dates(&self, alias_prefix: &str) -> Result<Vec<(String, i64)>> {
        naming::require_alias(alias_prefix)?;

        let response = self
            .transport
            .request(
                Method::Get,
                &format!("/{}*/_settings/index.creation_date", alias_prefix),
                None,
            )
            .await?;

        let indices = match &response.body {
            JsonValue::Object(indices) => indices,
            JsonValue::Null => return Ok(Vec::new()),
            other => {
                return Err(IndexError::UnexpectedResponse(format!(
                    "settings lookup returned {}",
                    other
                )));
            }
        };

        indices
            .iter()
            .map(|(name, entry)| -> Result<(String, i64)> {
                let created = entry
                    .pointer(CREATION_DATE_POINTER)
                    .and_then(parse_epoch_millis)
                    .ok_or_else(|| {
                        IndexError::UnexpectedResponse(format!(
                            "index '{}' has no readable creation_date",
                            name
                        ))
                    })?;
                Ok((name.clone(), created))
            })
            .collect()
    }

    /// Indices the alias currently points at; an unknown alias has none.
    pub async fn indices_for_alias(&self, alias: &str) -> Result<Vec<String>> {
        naming::validate_index_name(alias)?;

        let response = match self
            .transport
            .request(Method::Get, &format!("/_alias/{}", alias), None)
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(response
            .body
            .as_object()
            .map(|indices| indices.keys().cloned().collect())
            .unwrap_or_default())
    }
}

/// The store reports `creation_date` as a string; older versions used a number.
fn parse_epoch_millis(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::String(raw) => raw.parse().ok(),
        JsonValue::Number(number) => number.as_i64(),
        _ => None,
    }
}
