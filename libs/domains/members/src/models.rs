use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Member entity - matches SQL schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    /// Contact email (unique)
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            name,
            email,
            created_at: Utc::now(),
        }
    }
}
