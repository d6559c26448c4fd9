use super::identity::CurrentUser;
use super::jwt::{TokenError, TokenProvider, TokenUse};
use crate::errors::ApiError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Extract a bearer token from the Authorization header.
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.to_string()))
}

/// JWT authentication middleware.
///
/// Runs once per request on the route groups it is layered onto:
/// - no Authorization header: the request continues anonymously, and any
///   handler that extracts [`CurrentUser`] rejects it with 401;
/// - a bearer token that fails validation, is expired, or is not an
///   access token: the request short-circuits with 401 before reaching
///   the handler;
/// - a valid access token: [`CurrentUser`] is inserted into request
///   extensions for the extractors downstream.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::auth::{auth_middleware, TokenProvider};
///
/// let protected_routes = Router::new()
///     .route("/api/user", get(list_users))
///     .layer(axum::middleware::from_fn_with_state(
///         token_provider.clone(),
///         auth_middleware,
///     ));
/// ```
pub async fn auth_middleware(
    State(tokens): State<TokenProvider>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_token_from_request(&headers) else {
        tracing::debug!("No bearer token, continuing anonymously");
        return Ok(next.run(request).await);
    };

    let claims = tokens.decode(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {e}");
        match e {
            TokenError::Expired => ApiError::unauthenticated("Token has expired"),
            TokenError::Invalid => ApiError::unauthenticated("Invalid token"),
        }
    })?;

    if claims.token_use != TokenUse::Access {
        tracing::debug!("Refresh token presented as access credential");
        return Err(ApiError::unauthenticated("Invalid token"));
    }

    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::unauthenticated("Invalid token"))?;

    request.extensions_mut().insert(CurrentUser {
        id,
        username: claims.username,
        roles: claims.roles,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::config::JwtConfig;
    use axum::{Router, body::Body, http::Request as HttpRequest, http::StatusCode, routing::get};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-key-with-at-least-32-chars!";

    fn provider() -> TokenProvider {
        TokenProvider::new(&JwtConfig::new(SECRET))
    }

    async fn whoami(user: CurrentUser) -> String {
        user.username
    }

    fn app(tokens: TokenProvider) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn_with_state(tokens, auth_middleware))
    }

    fn request(auth: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().method("GET").uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_identity() {
        let tokens = provider();
        let token = tokens
            .issue_access(Uuid::now_v7(), "alice", &["USER".to_string()])
            .unwrap();

        let response = app(tokens)
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_yields_401_from_identity_extractor() {
        let response = app(provider()).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_short_circuits_401() {
        let response = app(provider())
            .oneshot(request(Some("Bearer not.a.token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_credential() {
        let tokens = provider();
        let refresh = tokens
            .issue_refresh(Uuid::now_v7(), "alice", &["USER".to_string()])
            .unwrap();

        let response = app(tokens)
            .oneshot(request(Some(&format!("Bearer {refresh}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
