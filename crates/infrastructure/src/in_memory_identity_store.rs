use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use warden_application::{
    AuthorizationAdminRepository, AuthorizationRepository, UserTokenRepository,
};
use warden_core::{AppError, AppResult, RoleId, UserId};
use warden_domain::{
    DEFAULT_ADMIN_ROLE_NAME, PermissionGrant, Role, SecurityStamp, TokenValidityRecord, User,
};

#[derive(Debug, Default)]
struct IdentityState {
    next_user_id: i64,
    next_role_id: i64,
    users: BTreeMap<UserId, User>,
    roles: BTreeMap<RoleId, Role>,
    user_roles: HashMap<UserId, Vec<RoleId>>,
    role_grants: HashMap<RoleId, Vec<PermissionGrant>>,
    user_grants: HashMap<UserId, Vec<PermissionGrant>>,
    tokens: Vec<TokenValidityRecord>,
}

impl IdentityState {
    fn require_user(&self, user_id: UserId) -> AppResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("user '{user_id}' does not exist")))
        }
    }
}

/// Process-local identity store for development and tests.
///
/// Holds users, roles, grant rows, and token validity records behind a single
/// lock so every replace operation is atomic.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    state: RwLock<IdentityState>,
}

impl InMemoryIdentityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the static `Admin` and default `User` roles
    /// plus an `admin` user assigned to the admin role.
    pub async fn seeded() -> AppResult<Self> {
        let store = Self::new();
        let admin_role = store
            .add_role(DEFAULT_ADMIN_ROLE_NAME, false, true)
            .await?;
        store.add_role("User", true, true).await?;
        let admin = store.add_user("admin").await?;
        store.replace_user_roles(admin.id(), &[admin_role]).await?;
        Ok(store)
    }

    /// Adds a role and returns its id.
    pub async fn add_role(
        &self,
        name: &str,
        is_default: bool,
        is_static: bool,
    ) -> AppResult<RoleId> {
        let mut state = self.state.write().await;
        if state
            .roles
            .values()
            .any(|role| role.name().eq_ignore_ascii_case(name))
        {
            return Err(AppError::Conflict(format!("role '{name}' already exists")));
        }

        state.next_role_id += 1;
        let role_id = RoleId::new(state.next_role_id);
        let role = Role::new(role_id, name, is_default, is_static)?;
        state.roles.insert(role_id, role);
        Ok(role_id)
    }

    /// Adds a user with a fresh security stamp.
    pub async fn add_user(&self, user_name: &str) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|user| user.user_name() == user_name)
        {
            return Err(AppError::Conflict(format!(
                "user '{user_name}' already exists"
            )));
        }

        state.next_user_id += 1;
        let user = User::new(
            UserId::new(state.next_user_id),
            user_name,
            SecurityStamp::generate(),
        )?;
        state.users.insert(user.id(), user.clone());
        Ok(user)
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryIdentityStore {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn list_role_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        Ok(self
            .state
            .read()
            .await
            .role_grants
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_user_role_ids(&self, user_id: UserId) -> AppResult<Option<Vec<RoleId>>> {
        let state = self.state.read().await;
        if !state.users.contains_key(&user_id) {
            return Ok(None);
        }

        Ok(Some(
            state.user_roles.get(&user_id).cloned().unwrap_or_default(),
        ))
    }

    async fn list_user_grants(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>> {
        Ok(self
            .state
            .read()
            .await
            .user_grants
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AuthorizationAdminRepository for InMemoryIdentityStore {
    async fn replace_role_grants(
        &self,
        role_id: RoleId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        state.role_grants.insert(role_id, grants.to_vec());
        Ok(())
    }

    async fn replace_user_grants(
        &self,
        user_id: UserId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        state.user_grants.insert(user_id, grants.to_vec());
        Ok(())
    }

    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        if let Some(missing) = role_ids
            .iter()
            .find(|role_id| !state.roles.contains_key(role_id))
        {
            return Err(AppError::NotFound(format!("role '{missing}' does not exist")));
        }

        state.user_roles.insert(user_id, role_ids.to_vec());
        Ok(())
    }
}

#[async_trait]
impl UserTokenRepository for InMemoryIdentityStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_security_stamp(&self, user_id: UserId) -> AppResult<Option<SecurityStamp>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .get(&user_id)
            .map(|user| user.security_stamp().clone()))
    }

    async fn update_security_stamp(
        &self,
        user_id: UserId,
        stamp: &SecurityStamp,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get(&user_id) else {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        };

        let updated = User::new(user_id, user.user_name(), stamp.clone())?;
        state.users.insert(user_id, updated);
        Ok(())
    }

    async fn create_token(&self, record: &TokenValidityRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(record.user_id)?;
        if state.tokens.iter().any(|stored| {
            stored.user_id == record.user_id && stored.token_key == record.token_key
        }) {
            return Err(AppError::Conflict(format!(
                "token key already exists for user '{}'",
                record.user_id
            )));
        }

        state.tokens.push(record.clone());
        Ok(())
    }

    async fn delete_token(&self, user_id: UserId, token_key: &str) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.tokens.len();
        state
            .tokens
            .retain(|record| !(record.user_id == user_id && record.token_key == token_key));
        Ok(state.tokens.len() != before)
    }

    async fn token_is_active(
        &self,
        user_id: UserId,
        token_key: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        Ok(self.state.read().await.tokens.iter().any(|record| {
            record.user_id == user_id && record.token_key == token_key && record.is_active_at(now)
        }))
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.tokens.len();
        state.tokens.retain(|record| record.is_active_at(now));
        Ok(u64::try_from(before - state.tokens.len()).unwrap_or(u64::MAX))
    }
}
