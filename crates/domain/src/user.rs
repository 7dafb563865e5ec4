use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{AppResult, NonEmptyString, UserId};

/// Per-user opaque value embedded in every token; rotating it invalidates them all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityStamp(String);

impl SecurityStamp {
    /// Wraps a stored stamp value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value).map(|value| Self(value.into()))
    }

    /// Generates a fresh random stamp.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the stamp value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether a claimed stamp equals this one.
    #[must_use]
    pub fn matches(&self, claimed: &str) -> bool {
        self.0.as_str() == claimed
    }
}

/// Identity record the token issuer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    user_name: NonEmptyString,
    security_stamp: SecurityStamp,
}

impl User {
    /// Creates a user projection.
    pub fn new(
        id: UserId,
        user_name: impl Into<String>,
        security_stamp: SecurityStamp,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            user_name: NonEmptyString::new(user_name)?,
            security_stamp,
        })
    }

    /// Returns the user id.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the login name.
    #[must_use]
    pub fn user_name(&self) -> &str {
        self.user_name.as_str()
    }

    /// Returns the current security stamp.
    #[must_use]
    pub fn security_stamp(&self) -> &SecurityStamp {
        &self.security_stamp
    }
}

#[cfg(test)]
mod tests {
    use super::SecurityStamp;

    #[test]
    fn generated_stamps_differ() {
        assert_ne!(SecurityStamp::generate(), SecurityStamp::generate());
    }

    #[test]
    fn stamp_matches_exact_value_only() {
        let stamp = SecurityStamp::new("stamp-1");
        assert!(stamp.is_ok());
        let stamp = stamp.unwrap_or_else(|_| SecurityStamp::generate());
        assert!(stamp.matches("stamp-1"));
        assert!(!stamp.matches("STAMP-1"));
    }
}
