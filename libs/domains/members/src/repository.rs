use async_trait::async_trait;
use axum_helpers::ApiError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Member;

/// Repository trait for Member lookups
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Create a new member
    async fn create(&self, member: Member) -> Result<Member, ApiError>;

    /// Get a member by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Member>, ApiError>;

    /// Check whether a member exists
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// In-memory implementation of MemberRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryMemberRepository {
    members: Arc<RwLock<HashMap<Uuid, Member>>>,
}

impl InMemoryMemberRepository {
    pub fn new() -> Self {
        Self {
            members: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn create(&self, member: Member) -> Result<Member, ApiError> {
        let mut members = self.members.write().await;
        members.insert(member.id, member.clone());

        tracing::info!(member_id = %member.id, "Created member");
        Ok(member)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Member>, ApiError> {
        let members = self.members.read().await;
        Ok(members.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        let members = self.members.read().await;
        Ok(members.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_get_member() {
        let repo = InMemoryMemberRepository::new();
        let member = Member::new("Acme".to_string(), "acme@example.com".to_string());

        let created = repo.create(member.clone()).await.unwrap();
        assert_eq!(created.email, "acme@example.com");

        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn exists_by_id() {
        let repo = InMemoryMemberRepository::new();
        let member = repo
            .create(Member::new("Acme".to_string(), "acme@example.com".to_string()))
            .await
            .unwrap();

        assert!(repo.exists_by_id(member.id).await.unwrap());
        assert!(!repo.exists_by_id(Uuid::now_v7()).await.unwrap());
    }
}
