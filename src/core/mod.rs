pub mod error;
pub mod types;

pub use error::{IndexError, Result};
pub use types::{
    AliasAction, AliasTarget, AliasUpdate, BulkFailure, BulkItemError, BulkItemOutcome,
    BulkReconciliation, Document, IndexSelection,
};
