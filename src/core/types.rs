use super::{IndexError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One index name or several, kept in the shape the caller supplied.
///
/// Serializes untagged so the `indices` field of an alias action is either a
/// JSON string or a JSON array, exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IndexSelection {
    Single(String),
    Many(Vec<String>),
}

impl IndexSelection {
    /// Reads an `add`/`remove` field from a dynamic JSON value.
    ///
    /// Accepts a string or an array of strings; anything else is a
    /// validation error naming the field.
    pub fn from_json(field: &str, value: &JsonValue) -> Result<Self> {
        let type_error = || {
            IndexError::Validation(format!(
                "{} must be a string or an array of strings",
                field
            ))
        };

        match value {
            JsonValue::String(name) => Ok(Self::Single(name.clone())),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(type_error))
                .collect::<Result<Vec<_>>>()
                .map(Self::Many),
            _ => Err(type_error()),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }

    pub(crate) fn validate(&self, field: &str) -> Result<()> {
        if let Self::Many(names) = self {
            if names.is_empty() {
                return Err(IndexError::Validation(format!(
                    "{} must name at least one index",
                    field
                )));
            }
        }
        if self.names().iter().any(|name| name.trim().is_empty()) {
            return Err(IndexError::Validation(format!(
                "{} must not contain empty index names",
                field
            )));
        }
        Ok(())
    }
}

impl From<&str> for IndexSelection {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<String> for IndexSelection {
    fn from(name: String) -> Self {
        Self::Single(name)
    }
}

impl From<Vec<String>> for IndexSelection {
    fn from(names: Vec<String>) -> Self {
        Self::Many(names)
    }
}

impl From<&[&str]> for IndexSelection {
    fn from(names: &[&str]) -> Self {
        Self::Many(names.iter().map(|name| name.to_string()).collect())
    }
}

/// Requested change to an alias' bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasUpdate {
    pub add: Option<IndexSelection>,
    pub remove: Option<IndexSelection>,
}

impl AliasUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, indices: impl Into<IndexSelection>) -> Self {
        self.add = Some(indices.into());
        self
    }

    pub fn remove(mut self, indices: impl Into<IndexSelection>) -> Self {
        self.remove = Some(indices.into());
        self
    }

    /// Builds an update from `{"add": ..., "remove": ...}`.
    ///
    /// Absent and `null` fields are treated the same.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            IndexError::Validation("alias update must be a JSON object".to_string())
        })?;

        let field = |name: &str| -> Result<Option<IndexSelection>> {
            match object.get(name) {
                None | Some(JsonValue::Null) => Ok(None),
                Some(value) => IndexSelection::from_json(name, value).map(Some),
            }
        };

        Ok(Self {
            add: field("add")?,
            remove: field("remove")?,
        })
    }

    /// Expands the update into the ordered action list for `alias`.
    ///
    /// Adds always precede removes.
    pub fn actions(&self, alias: &str) -> Result<Vec<AliasAction>> {
        if self.add.is_none() && self.remove.is_none() {
            return Err(IndexError::Validation(
                "You must add or remove at least one index".to_string(),
            ));
        }

        let mut actions = Vec::with_capacity(2);
        if let Some(add) = &self.add {
            add.validate("add")?;
            actions.push(AliasAction::Add(AliasTarget::new(add.clone(), alias)));
        }
        if let Some(remove) = &self.remove {
            remove.validate("remove")?;
            actions.push(AliasAction::Remove(AliasTarget::new(remove.clone(), alias)));
        }
        Ok(actions)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasTarget {
    pub indices: IndexSelection,
    pub alias: String,
}

impl AliasTarget {
    fn new(indices: IndexSelection, alias: &str) -> Self {
        Self {
            indices,
            alias: alias.to_string(),
        }
    }
}

/// A single entry of an `_aliases` submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasAction {
    Add(AliasTarget),
    Remove(AliasTarget),
}

/// A document queued for writing.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: JsonValue,
}

impl Document {
    pub fn new(id: impl Into<String>, body: JsonValue) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }
}

impl<I: Into<String>> From<(I, JsonValue)> for Document {
    fn from((id, body): (I, JsonValue)) -> Self {
        Self::new(id, body)
    }
}

/// Structured error the store attaches to a failed bulk item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemError {
    #[serde(rename = "type", default = "BulkItemError::untyped")]
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<Box<BulkItemError>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

impl BulkItemError {
    /// Type recorded when the store sent no `type` of its own.
    pub const UNTYPED: &'static str = "error";

    fn untyped() -> String {
        Self::UNTYPED.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BulkItemOutcome {
    Created { id: String },
    Updated { id: String },
    Failed { id: String, error: BulkItemError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkFailure {
    pub id: String,
    pub error: BulkItemError,
}

/// Per-document results of one bulk submission, partitioned by outcome.
///
/// Each list keeps the relative order of the submitted documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReconciliation {
    pub created_ids: Vec<String>,
    pub updated_ids: Vec<String>,
    pub errors: Vec<BulkFailure>,
}

impl BulkReconciliation {
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = BulkItemOutcome>) -> Self {
        let mut reconciliation = Self::default();
        for outcome in outcomes {
            match outcome {
                BulkItemOutcome::Created { id } => reconciliation.created_ids.push(id),
                BulkItemOutcome::Updated { id } => reconciliation.updated_ids.push(id),
                BulkItemOutcome::Failed { id, error } => {
                    reconciliation.errors.push(BulkFailure { id, error })
                }
            }
        }
        reconciliation
    }

    pub fn succeeded(&self) -> usize {
        self.created_ids.len() + self.updated_ids.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded() + self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
