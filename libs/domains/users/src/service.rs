use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::ApiError;
use axum_helpers::auth::{TokenError, TokenProvider, TokenUse};
use domain_members::MemberRepository;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::UserCache;
use crate::events::{UserAction, UserEvent, UserEventSink};
use crate::models::{LoginRequest, Role, TokenResponse, User, UserDto, UserFilter, UserRequest};
use crate::repository::UserRepository;

/// Service layer for user business logic: credential verification,
/// CRUD, token issuing, cache maintenance, and event emission.
pub struct UserService<R: UserRepository, M: MemberRepository> {
    repository: Arc<R>,
    members: Arc<M>,
    tokens: TokenProvider,
    events: Arc<dyn UserEventSink>,
    cache: UserCache,
}

impl<R: UserRepository, M: MemberRepository> Clone for UserService<R, M> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            members: self.members.clone(),
            tokens: self.tokens.clone(),
            events: self.events.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<R: UserRepository, M: MemberRepository> UserService<R, M> {
    pub fn new(
        repository: R,
        members: M,
        tokens: TokenProvider,
        events: Arc<dyn UserEventSink>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            members: Arc::new(members),
            tokens,
            events,
            cache: UserCache::new(),
        }
    }

    /// Verify credentials and issue an access/refresh token pair.
    pub async fn authenticate(&self, input: LoginRequest) -> Result<UserDto, ApiError> {
        let user = self
            .verify_credentials(&input.username, &input.password)
            .await?;

        let roles = user.role_names();
        let access = self.issue_access(user.id, &user.username, &roles)?;
        let refresh = self
            .tokens
            .issue_refresh(user.id, &user.username, &roles)
            .map_err(|e| {
                tracing::error!("Failed to issue refresh token: {e}");
                ApiError::app("Failed to issue token")
            })?;

        let dto = UserDto::from(user);
        self.events
            .publish(UserEvent::with_user(UserAction::Login, dto.clone()))
            .await;

        let mut dto = dto;
        dto.access_token = Some(access);
        dto.refresh_token = Some(refresh);
        Ok(dto)
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        let claims = self.tokens.decode(refresh_token).map_err(|e| match e {
            TokenError::Expired => ApiError::token_refresh("Token has expired"),
            TokenError::Invalid => ApiError::token_refresh("Invalid token"),
        })?;

        if claims.token_use != TokenUse::Refresh {
            return Err(ApiError::invalid_token("Token is not a refresh token"));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::token_refresh("Invalid token"))?;

        let access_token = self.issue_access(user_id, &claims.username, &claims.roles)?;
        Ok(TokenResponse { access_token })
    }

    /// Create a new user.
    pub async fn add(&self, input: UserRequest) -> Result<UserDto, ApiError> {
        if self.repository.exists_by_username(&input.username).await? {
            return Err(ApiError::insertion_failed(format!(
                "{} already exists",
                input.username
            )));
        }

        self.ensure_member_exists(input.member_id).await?;

        let password_hash = self.hash_password(&input.password)?;
        let roles: Vec<Role> = input
            .roles
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.parse().ok())
            .collect();

        let user = User::new(
            input.username,
            input.email,
            password_hash,
            roles,
            input.member_id,
        );

        let created = self.repository.create(user).await?;
        self.cache.invalidate_lists().await;

        let dto = UserDto::from(created);
        self.events
            .publish(UserEvent::with_user(UserAction::Created, dto.clone()))
            .await;

        Ok(dto)
    }

    /// Replace an existing user's data.
    pub async fn update(&self, id: Uuid, input: UserRequest) -> Result<UserDto, ApiError> {
        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User", "id", id))?;

        self.ensure_member_exists(input.member_id).await?;

        if !user.username.eq_ignore_ascii_case(&input.username)
            && self.repository.exists_by_username(&input.username).await?
        {
            return Err(ApiError::insertion_failed(format!(
                "{} already exists",
                input.username
            )));
        }

        if self
            .repository
            .email_taken_by_other(&input.email, id)
            .await?
        {
            return Err(ApiError::already_used(format!(
                "{} is already in use",
                input.email
            )));
        }

        let new_password_hash = self.hash_password(&input.password)?;
        user.apply_update(input, Some(new_password_hash));

        let updated = self.repository.update(user).await?;
        self.cache.invalidate(id).await;

        let dto = UserDto::from(updated);
        self.events
            .publish(UserEvent::with_user(UserAction::Updated, dto.clone()))
            .await;

        Ok(dto)
    }

    /// Delete a user.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.repository.exists_by_id(id).await? {
            return Err(ApiError::not_found("User", "id", id));
        }

        self.repository.delete(id).await?;
        self.cache.invalidate(id).await;

        self.events
            .publish(UserEvent::id_only(UserAction::Deleted, id))
            .await;

        Ok(())
    }

    /// List users, served through the read cache.
    pub async fn get_all(&self, filter: UserFilter) -> Result<Vec<UserDto>, ApiError> {
        let key = filter.cache_key();
        if let Some(cached) = self.cache.get_list(&key).await {
            return Ok(cached);
        }

        let users = self.repository.list(filter).await?;
        let dtos: Vec<UserDto> = users.into_iter().map(|u| u.into()).collect();

        self.cache.put_list(key, dtos.clone()).await;
        Ok(dtos)
    }

    /// Get a single user, served through the read cache.
    pub async fn get_by_id(&self, id: Uuid) -> Result<UserDto, ApiError> {
        if let Some(cached) = self.cache.get_user(id).await {
            return Ok(cached);
        }

        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User", "id", id))?;

        let dto = UserDto::from(user);
        self.cache.put_user(dto.clone()).await;
        Ok(dto)
    }

    /// Look up by username and check the password.
    ///
    /// When the username is unknown a hashing round still runs, so the
    /// response time does not reveal whether the account exists.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let Some(user) = self.repository.get_by_username(username).await? else {
            let _ = self.hash_password(password);
            return Err(ApiError::bad_credentials());
        };

        if !self.verify_password(password, &user.password_hash)? {
            return Err(ApiError::bad_credentials());
        }

        Ok(user)
    }

    async fn ensure_member_exists(&self, member_id: Uuid) -> Result<(), ApiError> {
        if !self.members.exists_by_id(member_id).await? {
            return Err(ApiError::bad_request(format!(
                "{} does not exist",
                member_id
            )));
        }
        Ok(())
    }

    fn issue_access(
        &self,
        user_id: Uuid,
        username: &str,
        roles: &[String],
    ) -> Result<String, ApiError> {
        self.tokens
            .issue_access(user_id, username, roles)
            .map_err(|e| {
                tracing::error!("Failed to issue access token: {e}");
                ApiError::app("Failed to issue token")
            })
    }

    // Password helpers

    fn hash_password(&self, password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!("Password hashing failed: {e}");
                ApiError::app("Password hashing failed")
            })
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Stored password hash is malformed: {e}");
            ApiError::app("Password verification failed")
        })?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
