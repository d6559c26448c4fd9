use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// User entity - matches SQL schema
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    /// Login name (unique)
    pub username: String,
    /// Contact email (unique)
    pub email: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub email_verified: bool,
    /// The member this account belongs to
    pub member_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user (password must already be hashed by the service)
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        roles: Vec<Role>,
        member_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username,
            email,
            password_hash,
            roles: if roles.is_empty() {
                vec![Role::User]
            } else {
                roles
            },
            email_verified: false,
            member_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update request (password must already be hashed if changed)
    pub fn apply_update(&mut self, request: UserRequest, new_password_hash: Option<String>) {
        self.username = request.username;
        self.email = request.email;
        self.member_id = request.member_id;
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        if let Some(roles) = request.roles {
            self.roles = roles.iter().filter_map(|r| r.parse().ok()).collect();
            if self.roles.is_empty() {
                self.roles = vec![Role::User];
            }
        }
        self.updated_at = Utc::now();
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.to_string()).collect()
    }
}

/// User response DTO (without password_hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub email_verified: bool,
    pub member_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set only on the login response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            roles: user.roles.iter().map(|r| r.to_string()).collect(),
            email_verified: user.email_verified,
            member_id: user.member_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            access_token: None,
            refresh_token: None,
        }
    }
}

/// DTO for creating or replacing a user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub member_id: Uuid,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

/// DTO for user login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// DTO for exchanging a refresh token for a new access token
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Response carrying a freshly issued access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Query filters for listing users
#[derive(Debug, Clone, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct UserFilter {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl UserFilter {
    /// Cache key for the list this filter selects.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.limit, self.offset)
    }
}

fn default_limit() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""ADMIN""#);
        assert_eq!(Role::User.to_string(), "USER");
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn new_user_defaults_to_user_role() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
            vec![],
            Uuid::now_v7(),
        );
        assert_eq!(user.roles, vec![Role::User]);
        assert!(!user.email_verified);
    }

    #[test]
    fn dto_omits_password_and_absent_tokens() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
            vec![Role::Admin],
            Uuid::now_v7(),
        );
        let json = serde_json::to_value(UserDto::from(user)).unwrap();

        assert!(json.get("password_hash").is_none());
        assert!(json.get("access_token").is_none());
        assert_eq!(json["roles"], serde_json::json!(["ADMIN"]));
    }

    #[test]
    fn apply_update_replaces_fields_and_touches_updated_at() {
        let member_id = Uuid::now_v7();
        let mut user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
            vec![Role::User],
            member_id,
        );
        let before = user.updated_at;

        user.apply_update(
            UserRequest {
                username: "alice2".to_string(),
                email: "alice2@example.com".to_string(),
                password: "ignored".to_string(),
                member_id,
                roles: Some(vec!["ADMIN".to_string()]),
            },
            Some("newhash".to_string()),
        );

        assert_eq!(user.username, "alice2");
        assert_eq!(user.password_hash, "newhash");
        assert_eq!(user.roles, vec![Role::Admin]);
        assert!(user.updated_at >= before);
    }

    #[test]
    fn filter_cache_key() {
        let filter = UserFilter {
            limit: 10,
            offset: 20,
        };
        assert_eq!(filter.cache_key(), "10:20");
        assert_eq!(UserFilter::default().cache_key(), "50:0");
    }
}
