use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::UserDto;

/// Lifecycle actions announced on the message bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserAction {
    Login,
    Created,
    Updated,
    Deleted,
}

impl UserAction {
    pub fn subject(&self) -> &'static str {
        match self {
            UserAction::Login => "user.login",
            UserAction::Created => "user.created",
            UserAction::Updated => "user.updated",
            UserAction::Deleted => "user.deleted",
        }
    }
}

/// Event payload published after a successful service operation.
///
/// Deletions carry only the id; every other action includes the DTO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEvent {
    pub action: UserAction,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
    pub occurred_at: DateTime<Utc>,
}

impl UserEvent {
    pub fn with_user(action: UserAction, user: UserDto) -> Self {
        Self {
            action,
            user_id: user.id,
            user: Some(user),
            occurred_at: Utc::now(),
        }
    }

    pub fn id_only(action: UserAction, user_id: Uuid) -> Self {
        Self {
            action,
            user_id,
            user: None,
            occurred_at: Utc::now(),
        }
    }
}

/// Outbound sink for user events.
///
/// Publishing is fire-and-forget: implementations log failures and never
/// surface them, so a broker outage cannot roll back a committed write.
#[async_trait]
pub trait UserEventSink: Send + Sync {
    async fn publish(&self, event: UserEvent);
}

/// Sink that drops every event; for environments without a broker and
/// for tests.
#[derive(Debug, Default, Clone)]
pub struct NoopEventSink;

#[async_trait]
impl UserEventSink for NoopEventSink {
    async fn publish(&self, event: UserEvent) {
        tracing::debug!(subject = event.action.subject(), user_id = %event.user_id, "Event dropped (no sink configured)");
    }
}
