//! Stateless JWT issuing and validation.
//!
//! Tokens are HS256-signed with a process-wide secret and are not persisted
//! anywhere; revocation before expiry is intentionally unsupported. Access
//! and refresh tokens share the claim shape and differ in `token_use` and
//! lifetime.

use crate::auth::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind as JwtError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT token time-to-live defaults
pub const ACCESS_TOKEN_TTL: i64 = 900; // 15 minutes
pub const REFRESH_TOKEN_TTL: i64 = 604800; // 7 days

/// Distinguishes the two token classes a [`TokenProvider`] issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user ID)
    pub username: String,   // Login name
    pub roles: Vec<String>, // User roles
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub jti: String,        // JWT ID
    pub token_use: TokenUse,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

/// Issues and validates signed tokens.
#[derive(Clone)]
pub struct TokenProvider {
    secret: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenProvider {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        }
    }

    /// Create a short-lived access token.
    pub fn issue_access(
        &self,
        user_id: Uuid,
        username: &str,
        roles: &[String],
    ) -> eyre::Result<String> {
        self.issue(user_id, username, roles, TokenUse::Access, self.access_ttl_secs)
    }

    /// Create a long-lived refresh token.
    pub fn issue_refresh(
        &self,
        user_id: Uuid,
        username: &str,
        roles: &[String],
    ) -> eyre::Result<String> {
        self.issue(
            user_id,
            username,
            roles,
            TokenUse::Refresh,
            self.refresh_ttl_secs,
        )
    }

    fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        roles: &[String],
        token_use: TokenUse,
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            roles: roles.to_vec(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_use,
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// Expiry is reported separately from every other failure so callers
    /// can tell clients to refresh instead of re-authenticating.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            JwtError::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
    }
}
