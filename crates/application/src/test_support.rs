use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use warden_core::{AppError, AppResult, RoleId, UserId};
use warden_domain::{
    PermissionCatalog, PermissionGrant, Role, SecurityStamp, TokenValidityRecord, User,
};

use crate::{
    AuthorizationAdminRepository, AuthorizationRepository, CacheAside, CacheSettings, CacheStore,
    RoleAuthority, UserAuthority, UserTokenRepository,
};

#[derive(Default)]
pub(crate) struct MemoryCache {
    pub(crate) entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub(crate) async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>, _ttl_seconds: u32) -> AppResult<()> {
        self.entries.lock().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

pub(crate) fn cache_over(store: Arc<MemoryCache>) -> CacheAside {
    CacheAside::new(store, CacheSettings::default())
}

#[derive(Default)]
pub(crate) struct FakeAuthorizationRepository {
    pub(crate) roles: Mutex<HashMap<RoleId, Role>>,
    pub(crate) role_grants: Mutex<HashMap<RoleId, Vec<PermissionGrant>>>,
    pub(crate) user_roles: Mutex<HashMap<UserId, Vec<RoleId>>>,
    pub(crate) user_grants: Mutex<HashMap<UserId, Vec<PermissionGrant>>>,
    pub(crate) user_role_reads: AtomicUsize,
    pub(crate) unavailable: AtomicBool,
}

impl FakeAuthorizationRepository {
    pub(crate) async fn with_role(self, id: i64, name: &str, grants: Vec<PermissionGrant>) -> Self {
        let role_id = RoleId::new(id);
        if let Ok(role) = Role::new(role_id, name, false, false) {
            self.roles.lock().await.insert(role_id, role);
        }
        self.role_grants.lock().await.insert(role_id, grants);
        self
    }

    pub(crate) async fn with_user(
        self,
        id: i64,
        role_ids: &[i64],
        grants: Vec<PermissionGrant>,
    ) -> Self {
        let user_id = UserId::new(id);
        self.user_roles
            .lock()
            .await
            .insert(user_id, role_ids.iter().copied().map(RoleId::new).collect());
        self.user_grants.lock().await.insert(user_id, grants);
        self
    }

    pub(crate) fn user_role_reads(&self) -> usize {
        self.user_role_reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable("database is unreachable".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.check_available()?;
        Ok(self.roles.lock().await.get(&role_id).cloned())
    }

    async fn list_role_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        self.check_available()?;
        Ok(self
            .role_grants
            .lock()
            .await
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_user_role_ids(&self, user_id: UserId) -> AppResult<Option<Vec<RoleId>>> {
        self.check_available()?;
        self.user_role_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.user_roles.lock().await.get(&user_id).cloned())
    }

    async fn list_user_grants(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>> {
        self.check_available()?;
        Ok(self
            .user_grants
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AuthorizationAdminRepository for FakeAuthorizationRepository {
    async fn replace_role_grants(
        &self,
        role_id: RoleId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        if !self.roles.lock().await.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }
        self.role_grants.lock().await.insert(role_id, grants.to_vec());
        Ok(())
    }

    async fn replace_user_grants(
        &self,
        user_id: UserId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        self.user_grants.lock().await.insert(user_id, grants.to_vec());
        Ok(())
    }

    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        self.user_roles.lock().await.insert(user_id, role_ids.to_vec());
        Ok(())
    }
}

pub(crate) fn user_authority(
    repository: Arc<FakeAuthorizationRepository>,
    cache: CacheAside,
) -> UserAuthority {
    let roles = RoleAuthority::new(
        repository.clone(),
        Arc::new(PermissionCatalog::standard()),
        cache.clone(),
        "Admin",
    );
    UserAuthority::new(repository, roles, cache)
}

#[derive(Default)]
pub(crate) struct FakeUserTokenRepository {
    pub(crate) users: Mutex<HashMap<UserId, User>>,
    pub(crate) tokens: Mutex<Vec<TokenValidityRecord>>,
    pub(crate) token_reads: AtomicUsize,
    pub(crate) stamp_reads: AtomicUsize,
}

impl FakeUserTokenRepository {
    pub(crate) async fn with_user(self, id: i64, stamp: &str) -> Self {
        let user_id = UserId::new(id);
        let user = SecurityStamp::new(stamp)
            .and_then(|stamp| User::new(user_id, format!("user{id}"), stamp));
        if let Ok(user) = user {
            self.users.lock().await.insert(user_id, user);
        }
        self
    }
}

#[async_trait]
impl UserTokenRepository for FakeUserTokenRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn find_security_stamp(&self, user_id: UserId) -> AppResult<Option<SecurityStamp>> {
        self.stamp_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .users
            .lock()
            .await
            .get(&user_id)
            .map(|user| user.security_stamp().clone()))
    }

    async fn update_security_stamp(&self, user_id: UserId, stamp: &SecurityStamp) -> AppResult<()> {
        let mut users = self.users.lock().await;
        let user = users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        let updated = User::new(user_id, user.user_name(), stamp.clone())?;
        users.insert(user_id, updated);
        Ok(())
    }

    async fn create_token(&self, record: &TokenValidityRecord) -> AppResult<()> {
        self.tokens.lock().await.push(record.clone());
        Ok(())
    }

    async fn delete_token(&self, user_id: UserId, token_key: &str) -> AppResult<bool> {
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|record| !(record.user_id == user_id && record.token_key == token_key));
        Ok(tokens.len() != before)
    }

    async fn token_is_active(
        &self,
        user_id: UserId,
        token_key: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.token_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.tokens.lock().await.iter().any(|record| {
            record.user_id == user_id && record.token_key == token_key && record.is_active_at(now)
        }))
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|record| record.is_active_at(now));
        Ok((before - tokens.len()) as u64)
    }
}
