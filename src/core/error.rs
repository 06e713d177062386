use thiserror::Error;

/// Error types the store reports when an index name is already taken.
const ALREADY_EXISTS_TYPES: [&str; 2] = [
    "resource_already_exists_exception",
    "index_already_exists_exception",
];

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Index '{index}' already exists")]
    IndexAlreadyExists {
        index: String,
        status: u16,
        body: String,
    },

    #[error("Store returned status {status}: {body}")]
    Store { status: u16, body: String },

    #[error("Store did not acknowledge {0}")]
    NotAcknowledged(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Failed to delete {} of {} indices", .failures.len(), .deleted.len() + .failures.len())]
    Cleanup {
        deleted: Vec<String>,
        failures: Vec<(String, IndexError)>,
    },
}

pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    /// HTTP status carried by a store failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            IndexError::Store { status, .. } | IndexError::IndexAlreadyExists { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// The `error.type` field of a store failure body.
    pub fn error_type(&self) -> Option<String> {
        match self {
            IndexError::Store { body, .. } | IndexError::IndexAlreadyExists { body, .. } => {
                error_type_of(body)
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, IndexError::IndexAlreadyExists { .. })
    }

    /// Reclassifies a store failure as a create conflict when the body says so.
    pub(crate) fn into_create_error(self, index: &str) -> IndexError {
        match self {
            IndexError::Store { status, body } => {
                let conflict = error_type_of(&body)
                    .is_some_and(|kind| ALREADY_EXISTS_TYPES.contains(&kind.as_str()));
                if conflict {
                    IndexError::IndexAlreadyExists {
                        index: index.to_string(),
                        status,
                        body,
                    }
                } else {
                    IndexError::Store { status, body }
                }
            }
            other => other,
        }
    }
}

fn error_type_of(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")?
        .get("type")?
        .as_str()
        .map(str::to_string)
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for IndexError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
