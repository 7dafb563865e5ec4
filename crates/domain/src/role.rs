use serde::{Deserialize, Serialize};
use warden_core::{AppResult, NonEmptyString, RoleId};

/// Role name that receives every catalog permission unless explicitly prohibited.
pub const DEFAULT_ADMIN_ROLE_NAME: &str = "Admin";

/// Role definition as stored by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    is_default: bool,
    is_static: bool,
}

impl Role {
    /// Creates a validated role.
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        is_default: bool,
        is_static: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            is_default,
            is_static,
        })
    }

    /// Returns the role id.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns whether new users join this role automatically.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Returns whether the role is seeded and cannot be deleted.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Returns whether this is the configured admin role (case-insensitive match).
    #[must_use]
    pub fn is_admin(&self, admin_role_name: &str) -> bool {
        self.name.as_str().eq_ignore_ascii_case(admin_role_name)
    }
}
