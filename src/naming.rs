//! Index naming
//!
//! Generated names are `<alias>_<YYYYMMDD>_<HHmmss>` with the timestamp taken
//! from the UTC wall clock. Two names generated within the same second
//! collide; callers that need more must append their own suffix.

use crate::core::{IndexError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// chrono format of the timestamp suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const TIMESTAMP_LEN: usize = "YYYYMMDD_HHmmss".len();

const MAX_NAME_BYTES: usize = 255;

const FORBIDDEN_CHARS: [char; 12] = ['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#', ':'];

/// Name for a new index behind `alias`, stamped with the current UTC time.
pub fn timestamped_name(alias: &str) -> Result<String> {
    timestamped_name_at(alias, Utc::now())
}

pub fn timestamped_name_at(alias: &str, at: DateTime<Utc>) -> Result<String> {
    require_alias(alias)?;
    Ok(format!("{}_{}", alias, at.format(TIMESTAMP_FORMAT)))
}

/// Recovers the creation time encoded in a name produced for `alias`.
pub fn parse_timestamped_name(alias: &str, name: &str) -> Result<DateTime<Utc>> {
    let stamp = name
        .strip_prefix(alias)
        .and_then(|rest| rest.strip_prefix('_'))
        .filter(|stamp| stamp.len() == TIMESTAMP_LEN)
        .ok_or_else(|| {
            IndexError::Validation(format!(
                "'{}' is not a timestamped index of alias '{}'",
                name, alias
            ))
        })?;

    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| IndexError::Validation(format!("Invalid timestamp in '{}': {}", name, e)))
}

pub(crate) fn require_alias(alias: &str) -> Result<()> {
    if alias.trim().is_empty() {
        return Err(IndexError::Validation(
            "Alias name must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

/// Checks a caller-supplied index or alias name against the store's rules.
pub fn validate_index_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(IndexError::Validation(format!(
            "Invalid index name '{}': {}",
            name, reason
        )))
    };

    if name.is_empty() {
        return invalid("must not be empty");
    }
    if name == "." || name == ".." {
        return invalid("must not be '.' or '..'");
    }
    if name.len() > MAX_NAME_BYTES {
        return invalid("longer than 255 bytes");
    }
    if name.starts_with(['-', '_', '+']) {
        return invalid("must not start with '-', '_' or '+'");
    }
    if name.chars().any(|c| c.is_uppercase()) {
        return invalid("must be lowercase");
    }
    if name.contains(FORBIDDEN_CHARS) {
        return invalid("contains a forbidden character");
    }
    Ok(())
}
