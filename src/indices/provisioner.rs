use crate::core::{IndexError, Result};
use crate::interface::{Method, RequestBody, Transport};
use crate::naming;
use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use tracing::info;

/// Creates and deletes indices.
#[derive(Clone)]
pub struct IndexProvisioner {
    transport: Arc<dyn Transport>,
}

impl IndexProvisioner {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create `name` with the given mappings and settings.
    ///
    /// An index that already exists surfaces as `IndexError::IndexAlreadyExists`
    /// so callers can decide whether that is benign.
    pub async fn create_index(
        &self,
        name: &str,
        mappings: &JsonValue,
        settings: &JsonValue,
    ) -> Result<()> {
        naming::validate_index_name(name)?;

        let body = json!({
            "settings": settings,
            "mappings": mappings,
        });
        let response = self
            .transport
            .request(Method::Put, &format!("/{}", name), Some(RequestBody::Json(body)))
            .await
            .map_err(|e| e.into_create_error(name))?;

        if !response.acknowledged() {
            return Err(IndexError::NotAcknowledged(format!("creation of index '{}'", name)));
        }

        info!(index = name, "created index");
        Ok(())
    }

    /// Create `<alias>_<YYYYMMDD>_<HHmmss>` and return the generated name.
    pub async fn create_timestamped_index(
        &self,
        alias: &str,
        mappings: &JsonValue,
        settings: &JsonValue,
    ) -> Result<String> {
        self.create_timestamped_index_at(alias, mappings, settings, Utc::now())
            .await
    }

    /// Same as `create_timestamped_index`, stamped with `at` instead of now.
    pub async fn create_timestamped_index_at(
        &self,
        alias: &str,
        mappings: &JsonValue,
        settings: &JsonValue,
        at: DateTime<Utc>,
    ) -> Result<String> {
        let name = naming::timestamped_name_at(alias, at)?;
        self.create_index(&name, mappings, settings).await?;
        Ok(name)
    }

    pub async fn delete_index(&self, name: &str) -> Result<()> {
        naming::validate_index_name(name)?;

        let response = self
            .transport
            .request(Method::Delete, &format!("/{}", name), None)
            .await?;

        if !response.acknowledged() {
            return Err(IndexError::NotAcknowledged(format!("deletion of index '{}'", name)));
        }

        info!(index = name, "deleted index");
        Ok(())
    }

    pub async fn index_exists(&self, name: &str) -> Result<bool> {
        naming::validate_index_name(name)?;

        match self
            .transport
            .request(Method::Head, &format!("/{}", name), None)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
