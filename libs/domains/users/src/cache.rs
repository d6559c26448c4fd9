use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::UserDto;

/// In-process read cache for user lookups.
///
/// Mirrors the read paths of the service: single users by id and list
/// pages by filter key. Mutating operations call [`UserCache::invalidate`]
/// (or [`UserCache::invalidate_lists`] for inserts) on their success path,
/// before returning, so readers never see a stale entry after a write
/// completes.
#[derive(Debug, Default, Clone)]
pub struct UserCache {
    users: Arc<RwLock<HashMap<Uuid, UserDto>>>,
    lists: Arc<RwLock<HashMap<String, Vec<UserDto>>>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_user(&self, id: Uuid) -> Option<UserDto> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn put_user(&self, user: UserDto) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn get_list(&self, key: &str) -> Option<Vec<UserDto>> {
        self.lists.read().await.get(key).cloned()
    }

    pub async fn put_list(&self, key: String, users: Vec<UserDto>) {
        self.lists.write().await.insert(key, users);
    }

    /// Drop the cached entry for `id` and every list page (any page may
    /// contain the user).
    pub async fn invalidate(&self, id: Uuid) {
        self.users.write().await.remove(&id);
        self.lists.write().await.clear();
    }

    /// Drop every cached list page; used after inserts, which cannot name
    /// an existing entry.
    pub async fn invalidate_lists(&self) {
        self.lists.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};

    fn dto(username: &str) -> UserDto {
        User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "hash".to_string(),
            vec![Role::User],
            Uuid::now_v7(),
        )
        .into()
    }

    #[tokio::test]
    async fn put_and_get_user() {
        let cache = UserCache::new();
        let user = dto("alice");

        assert!(cache.get_user(user.id).await.is_none());
        cache.put_user(user.clone()).await;
        assert_eq!(cache.get_user(user.id).await, Some(user));
    }

    #[tokio::test]
    async fn invalidate_clears_user_and_lists() {
        let cache = UserCache::new();
        let user = dto("alice");

        cache.put_user(user.clone()).await;
        cache
            .put_list("50:0".to_string(), vec![user.clone()])
            .await;

        cache.invalidate(user.id).await;

        assert!(cache.get_user(user.id).await.is_none());
        assert!(cache.get_list("50:0").await.is_none());
    }

    #[tokio::test]
    async fn invalidate_lists_keeps_single_entries() {
        let cache = UserCache::new();
        let user = dto("alice");

        cache.put_user(user.clone()).await;
        cache.put_list("50:0".to_string(), vec![user.clone()]).await;

        cache.invalidate_lists().await;

        assert!(cache.get_user(user.id).await.is_some());
        assert!(cache.get_list("50:0").await.is_none());
    }
}
