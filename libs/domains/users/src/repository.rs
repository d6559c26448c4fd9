use async_trait::async_trait;
use axum_helpers::ApiError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{User, UserFilter};

/// Repository trait for User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: User) -> Result<User, ApiError>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    /// Get a user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    /// List users, newest first, with pagination
    async fn list(&self, filter: UserFilter) -> Result<Vec<User>, ApiError>;

    /// Update an existing user
    async fn update(&self, user: User) -> Result<User, ApiError>;

    /// Delete a user by ID; returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Check if a username is already taken
    async fn exists_by_username(&self, username: &str) -> Result<bool, ApiError>;

    /// Check if a user exists
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Check if an email belongs to a user other than `exclude`
    async fn email_taken_by_other(&self, email: &str, exclude: Uuid) -> Result<bool, ApiError>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, ApiError> {
        let mut users = self.users.write().await;

        let username_exists = users
            .values()
            .any(|u| u.username.to_lowercase() == user.username.to_lowercase());

        if username_exists {
            return Err(ApiError::insertion_failed(format!(
                "{} already exists",
                user.username
            )));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, username = %user.username, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.username.to_lowercase() == username.to_lowercase())
            .cloned();
        Ok(user)
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>, ApiError> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    async fn update(&self, user: User) -> Result<User, ApiError> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(ApiError::not_found("User", "id", user.id));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, ApiError> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        let users = self.users.read().await;
        Ok(users.contains_key(&id))
    }

    async fn email_taken_by_other(&self, email: &str, exclude: Uuid) -> Result<bool, ApiError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .any(|u| u.id != exclude && u.email.to_lowercase() == email.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use axum_helpers::ErrorKind;

    fn user(username: &str, email: &str) -> User {
        User::new(
            username.to_string(),
            email.to_string(),
            "hashed_password".to_string(),
            vec![Role::User],
            Uuid::now_v7(),
        )
    }

    #[tokio::test]
    async fn create_and_get_user() {
        let repo = InMemoryUserRepository::new();

        let created = repo.create(user("alice", "alice@example.com")).await.unwrap();
        assert_eq!(created.username, "alice");

        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn get_by_username_is_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("Alice", "alice@example.com")).await.unwrap();

        assert!(repo.get_by_username("alice").await.unwrap().is_some());
        assert!(repo.get_by_username("ALICE").await.unwrap().is_some());
        assert!(repo.get_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("alice", "one@example.com")).await.unwrap();

        let err = repo
            .create(user("alice", "two@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InsertionFailed);
        assert_eq!(err.message, "alice already exists");
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paged() {
        let repo = InMemoryUserRepository::new();
        for i in 0..5 {
            repo.create(user(&format!("user{i}"), &format!("u{i}@example.com")))
                .await
                .unwrap();
        }

        let page = repo
            .list(UserFilter {
                limit: 2,
                offset: 1,
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert!(page[0].created_at >= page[1].created_at);
    }

    #[tokio::test]
    async fn update_missing_user_fails() {
        let repo = InMemoryUserRepository::new();
        let ghost = user("ghost", "ghost@example.com");

        let err = repo.update(ghost).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("alice", "alice@example.com")).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn email_taken_by_other_excludes_self() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(user("alice", "alice@example.com")).await.unwrap();
        repo.create(user("bob", "bob@example.com")).await.unwrap();

        assert!(
            !repo
                .email_taken_by_other("alice@example.com", alice.id)
                .await
                .unwrap()
        );
        assert!(
            repo.email_taken_by_other("bob@example.com", alice.id)
                .await
                .unwrap()
        );
    }
}
