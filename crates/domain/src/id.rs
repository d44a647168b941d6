//! Identifier generation and validation.

use uuid::Uuid;

use crate::{DomainError, DomainResult};

/// Generates a new user id.
///
/// Hosted identity services assign their own uids; this is used by the
/// in-memory backend. UUID v7 keeps ids sortable by creation time.
#[must_use]
pub fn generate_uid() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Checks that a uid can be used as a document key.
///
/// # Errors
///
/// Returns `InvalidIdentifier` for empty ids or ids containing `/`,
/// which would address a nested document path.
pub fn validate_uid(uid: &str) -> DomainResult<&str> {
    if uid.trim().is_empty() {
        return Err(DomainError::InvalidIdentifier("uid is empty".to_string()));
    }
    if uid.contains('/') {
        return Err(DomainError::InvalidIdentifier(format!(
            "uid must not contain '/': {uid}"
        )));
    }
    Ok(uid)
}
