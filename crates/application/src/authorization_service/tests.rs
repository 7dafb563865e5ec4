use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use warden_core::{AppError, AppResult, RoleId, UserId};
use warden_domain::{
    CachedRoleMembership, PermissionGrant, PermissionSet, RolePermissionSnapshot,
    UserPermissionGrants,
};

use crate::test_support::{FakeAuthorizationRepository, MemoryCache, cache_over, user_authority};
use crate::{CacheAside, PermissionAuthority, UserAuthority, cache_keys};

use super::AuthorizationService;

const USERS: &str = "Pages.Administration.Users";
const ROLES: &str = "Pages.Administration.Roles";

struct UnavailableAuthority;

#[async_trait]
impl PermissionAuthority for UnavailableAuthority {
    async fn granted_permissions(&self, _user_id: UserId) -> AppResult<PermissionSet> {
        Err(AppError::Unavailable("identity service timed out".to_owned()))
    }
}

/// Stands in for the RPC bridge: the identity side resolves against its own
/// cache front, which shares the backing store with the caller.
struct SharedStoreRemote {
    identity: UserAuthority,
    calls: AtomicUsize,
}

#[async_trait]
impl PermissionAuthority for SharedStoreRemote {
    async fn granted_permissions(&self, user_id: UserId) -> AppResult<PermissionSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.identity.resolve_user_permissions(user_id).await
    }
}

fn names(values: &[&str]) -> PermissionSet {
    values.iter().map(|value| (*value).to_owned()).collect()
}

async fn cache_user(
    cache: &CacheAside,
    user_id: i64,
    role_ids: &[i64],
    granted: &[&str],
    prohibited: &[&str],
) {
    let user_id = UserId::new(user_id);
    cache
        .store(
            &cache_keys::user_role_membership(user_id),
            &CachedRoleMembership {
                user_id,
                role_ids: role_ids.iter().copied().map(RoleId::new).collect(),
            },
        )
        .await;
    cache
        .store(
            &cache_keys::user_permission_grants(user_id),
            &UserPermissionGrants {
                user_id,
                granted: names(granted),
                prohibited: names(prohibited),
            },
        )
        .await;
}

async fn cache_role(cache: &CacheAside, role_id: i64, granted: &[&str]) {
    let role_id = RoleId::new(role_id);
    cache
        .store(
            &cache_keys::role_permissions(role_id),
            &RolePermissionSnapshot {
                role_id,
                granted: names(granted),
            },
        )
        .await;
}

#[tokio::test]
async fn user_level_cached_grants_resolve_without_roles() {
    let cache = cache_over(Arc::new(MemoryCache::default()));
    cache_user(&cache, 1, &[], &[USERS, ROLES], &[]).await;
    let gate = AuthorizationService::new(Arc::new(UnavailableAuthority), cache);

    let permissions = gate.granted_permissions(UserId::new(1)).await;
    assert_eq!(permissions.ok(), Some(names(&[USERS, ROLES])));
    assert!(matches!(gate.authorize(UserId::new(1), USERS).await, Ok(true)));
}

#[tokio::test]
async fn cached_role_grants_resolve_through_role_path() {
    let cache = cache_over(Arc::new(MemoryCache::default()));
    cache_user(&cache, 2, &[1], &[], &[]).await;
    cache_role(&cache, 1, &[USERS, ROLES]).await;
    let gate = AuthorizationService::new(Arc::new(UnavailableAuthority), cache);

    let permissions = gate.granted_permissions(UserId::new(2)).await;
    assert_eq!(permissions.ok(), Some(names(&[USERS, ROLES])));
}

#[tokio::test]
async fn cached_user_prohibit_overrides_role_grant() {
    let cache = cache_over(Arc::new(MemoryCache::default()));
    cache_user(&cache, 3, &[1], &[], &[USERS]).await;
    cache_role(&cache, 1, &[USERS, ROLES]).await;
    let gate = AuthorizationService::new(Arc::new(UnavailableAuthority), cache);

    let permissions = gate.granted_permissions(UserId::new(3)).await;
    assert_eq!(permissions.ok(), Some(names(&[ROLES])));
    assert!(matches!(gate.authorize(UserId::new(3), USERS).await, Ok(false)));
}

#[tokio::test]
async fn cold_cache_falls_through_to_authority_and_populates_cache() {
    let store = Arc::new(MemoryCache::default());
    let cache = cache_over(store.clone());
    let repository = Arc::new(
        FakeAuthorizationRepository::default()
            .with_user(4, &[], vec![PermissionGrant::granted(USERS)])
            .await,
    );
    let authority = user_authority(repository.clone(), cache.clone());
    let gate = AuthorizationService::new(Arc::new(authority), cache);

    let first = gate.granted_permissions(UserId::new(4)).await;
    assert_eq!(first.ok(), Some(names(&[USERS])));
    assert!(
        store
            .contains(&cache_keys::user_role_membership(UserId::new(4)))
            .await
    );
    assert!(
        store
            .contains(&cache_keys::user_permission_grants(UserId::new(4)))
            .await
    );

    let second = gate.granted_permissions(UserId::new(4)).await;
    assert_eq!(second.ok(), Some(names(&[USERS])));
    assert_eq!(repository.user_role_reads(), 1);
}

#[tokio::test]
async fn remote_resolution_warms_the_shared_cache_for_later_checks() {
    let shared_store = Arc::new(MemoryCache::default());
    let repository = Arc::new(
        FakeAuthorizationRepository::default()
            .with_role(7, "Editor", vec![PermissionGrant::granted(ROLES)])
            .await
            .with_user(4, &[7], vec![PermissionGrant::granted(USERS)])
            .await,
    );
    let remote = Arc::new(SharedStoreRemote {
        identity: user_authority(repository, cache_over(shared_store.clone())),
        calls: AtomicUsize::new(0),
    });
    let gate = AuthorizationService::new(remote.clone(), cache_over(shared_store));

    for _ in 0..3 {
        let permissions = gate.granted_permissions(UserId::new(4)).await;
        assert_eq!(permissions.ok(), Some(names(&[USERS, ROLES])));
    }
    assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_role_snapshot_triggers_authority_lookup() {
    let cache = cache_over(Arc::new(MemoryCache::default()));
    cache_user(&cache, 5, &[7], &[ROLES], &[]).await;
    let gate = AuthorizationService::new(Arc::new(UnavailableAuthority), cache);

    let result = gate.granted_permissions(UserId::new(5)).await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
}

#[tokio::test]
async fn authority_failure_is_not_reported_as_forbidden() {
    let cache = cache_over(Arc::new(MemoryCache::default()));
    let gate = AuthorizationService::new(Arc::new(UnavailableAuthority), cache);

    let result = gate.require_permission(UserId::new(9), USERS).await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
}

#[tokio::test]
async fn require_permission_denies_missing_grant() {
    let cache = cache_over(Arc::new(MemoryCache::default()));
    cache_user(&cache, 6, &[], &[ROLES], &[]).await;
    let gate = AuthorizationService::new(Arc::new(UnavailableAuthority), cache);

    let denied = gate.require_permission(UserId::new(6), USERS).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    assert!(gate.require_permission(UserId::new(6), ROLES).await.is_ok());
}
