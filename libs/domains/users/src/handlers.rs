use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_helpers::auth::{CurrentUser, RequireAdmin};
use axum_helpers::extractors::{Path, Query};
use axum_helpers::{ApiError, ApiResponse, ValidatedJson};
use domain_members::MemberRepository;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{LoginRequest, RefreshRequest, TokenResponse, UserDto, UserFilter, UserRequest};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Router for `/user`: CRUD behind the authentication filter. Reads
/// require any authenticated principal, mutations require `ADMIN`.
pub fn user_router<R, M>(service: UserService<R, M>) -> Router
where
    R: UserRepository + 'static,
    M: MemberRepository + 'static,
{
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(Arc::new(service))
}

/// Router for `/auth`: public login and token refresh.
pub fn auth_router<R, M>(service: UserService<R, M>) -> Router
where
    R: UserRepository + 'static,
    M: MemberRepository + 'static,
{
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .with_state(Arc::new(service))
}

/// User login
///
/// POST /auth/login
async fn login<R: UserRepository, M: MemberRepository>(
    State(service): State<Arc<UserService<R, M>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = service.authenticate(input).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Exchange a refresh token for a new access token
///
/// POST /auth/refresh
async fn refresh<R: UserRepository, M: MemberRepository>(
    State(service): State<Arc<UserService<R, M>>>,
    ValidatedJson(input): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let tokens = service.refresh(&input.refresh_token).await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

/// Create a new user (admin only)
///
/// POST /user
async fn create_user<R: UserRepository, M: MemberRepository>(
    State(service): State<Arc<UserService<R, M>>>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<UserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = service.add(input).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// List users, paged
///
/// GET /user?limit=50&offset=0
async fn list_users<R: UserRepository, M: MemberRepository>(
    State(service): State<Arc<UserService<R, M>>>,
    _user: CurrentUser,
    Query(filter): Query<UserFilter>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = service.get_all(filter).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// Get a user by ID
///
/// GET /user/:id
async fn get_user<R: UserRepository, M: MemberRepository>(
    State(service): State<Arc<UserService<R, M>>>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Replace a user (admin only)
///
/// PUT /user/:id
async fn update_user<R: UserRepository, M: MemberRepository>(
    State(service): State<Arc<UserService<R, M>>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<UserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = service.update(id, input).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Delete a user (admin only)
///
/// DELETE /user/:id
async fn delete_user<R: UserRepository, M: MemberRepository>(
    State(service): State<Arc<UserService<R, M>>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::ok(serde_json::json!({ "id": id }))))
}
