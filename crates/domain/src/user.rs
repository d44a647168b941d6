//! Per-user profile document.

use crate::document::{FieldValue, Fields};
use crate::{DomainError, DomainResult, Timestamp};

/// Collection holding one document per user, keyed by uid.
pub const USERS_COLLECTION: &str = "users";

/// Field holding the number of debates a user may still start for free.
pub const REMAINING_FREE_DEBATES_FIELD: &str = "remainingFreeDebates";

/// Free debates granted at registration.
pub const DEFAULT_FREE_DEBATES: i64 = 3;

/// Profile and quota record stored for each registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDocument {
    /// Owning user id (also the document key).
    pub uid: String,
    /// Email used to register.
    pub email: String,
    /// Full name.
    pub name: String,
    /// Public handle.
    pub username: String,
    /// Free debates left.
    pub remaining_free_debates: i64,
    /// Registration time.
    pub created_at: Timestamp,
}

impl UserDocument {
    /// Creates a document with the default free-debate quota.
    #[must_use]
    pub fn new(
        uid: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        username: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            name: name.into(),
            username: username.into(),
            remaining_free_debates: DEFAULT_FREE_DEBATES,
            created_at,
        }
    }

    /// Overrides the starting quota.
    #[must_use]
    pub const fn with_free_debates(mut self, remaining: i64) -> Self {
        self.remaining_free_debates = remaining;
        self
    }

    /// Returns true if the user may start another free debate.
    #[must_use]
    pub const fn can_start_new_debate(&self) -> bool {
        self.remaining_free_debates > 0
    }

    /// Encodes the document as store fields.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        Fields::from([
            ("uid".to_string(), FieldValue::from(self.uid.as_str())),
            ("email".to_string(), FieldValue::from(self.email.as_str())),
            ("name".to_string(), FieldValue::from(self.name.as_str())),
            ("username".to_string(), FieldValue::from(self.username.as_str())),
            (
                REMAINING_FREE_DEBATES_FIELD.to_string(),
                FieldValue::Integer(self.remaining_free_debates),
            ),
            ("createdAt".to_string(), FieldValue::Timestamp(self.created_at)),
        ])
    }

    /// Decodes a document read from the store.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` if a field is missing or has the wrong type.
    pub fn from_fields(fields: &Fields) -> DomainResult<Self> {
        Ok(Self {
            uid: string_field(fields, "uid")?,
            email: string_field(fields, "email")?,
            name: string_field(fields, "name")?,
            username: string_field(fields, "username")?,
            remaining_free_debates: fields
                .get(REMAINING_FREE_DEBATES_FIELD)
                .and_then(FieldValue::as_i64)
                .ok_or_else(|| invalid(REMAINING_FREE_DEBATES_FIELD, "expected an integer"))?,
            created_at: *fields
                .get("createdAt")
                .and_then(FieldValue::as_timestamp)
                .ok_or_else(|| invalid("createdAt", "expected a timestamp"))?,
        })
    }
}

/// Returns true if raw document fields grant at least one more free debate.
///
/// Only the quota field is inspected, so partially written documents
/// still answer correctly.
#[must_use]
pub fn has_remaining_free_debates(fields: &Fields) -> bool {
    fields
        .get(REMAINING_FREE_DEBATES_FIELD)
        .is_some_and(FieldValue::is_positive_number)
}

fn string_field(fields: &Fields, name: &str) -> DomainResult<String> {
    fields
        .get(name)
        .and_then(FieldValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid(name, "expected a string"))
}

fn invalid(field: &str, reason: &str) -> DomainError {
    DomainError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn user() -> UserDocument {
        UserDocument::new(
            "u1",
            "ada@example.com",
            "Ada Lovelace",
            "ada",
            Timestamp::from_millis(1_700_000_000_000).unwrap(),
        )
    }

    #[test]
    fn test_fields_round_trip() {
        let doc = user();
        let fields = doc.to_fields();
        assert_eq!(fields.get("remainingFreeDebates"), Some(&FieldValue::Integer(3)));
        assert_eq!(UserDocument::from_fields(&fields).unwrap(), doc);
    }

    #[test]
    fn test_from_fields_reports_missing_field() {
        let mut fields = user().to_fields();
        fields.remove("username");
        let err = UserDocument::from_fields(&fields).unwrap_err();
        assert!(matches!(err, DomainError::InvalidField { field, .. } if field == "username"));
    }

    #[test]
    fn test_quota_checks() {
        assert!(user().can_start_new_debate());
        assert!(!user().with_free_debates(0).can_start_new_debate());

        assert!(has_remaining_free_debates(&user().to_fields()));
        assert!(!has_remaining_free_debates(&user().with_free_debates(0).to_fields()));
        assert!(!has_remaining_free_debates(&Fields::new()));

        let fields = Fields::from([(
            REMAINING_FREE_DEBATES_FIELD.to_string(),
            FieldValue::String("3".into()),
        )]);
        assert!(!has_remaining_free_debates(&fields));
    }
}
