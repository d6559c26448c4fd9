pub mod handlers;
pub mod messages;

use crate::envelope::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Classifies an [`ApiError`] for HTTP translation.
///
/// Every fallible path in the API produces one of these kinds; the single
/// mapping table in [`ApiError::into_response`] is the only place where a
/// kind becomes a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, bad argument, or a domain precondition failure.
    BadRequest,
    /// Request body failed declarative validation.
    Validation,
    /// No usable identity on a route that requires one.
    Unauthenticated,
    /// Identity present but lacks the required role.
    AccessDenied,
    /// Addressed resource does not exist.
    NotFound,
    /// Authenticated principal no longer resolvable.
    PrincipalNotFound,
    /// Token is structurally valid JSON Web Token but unacceptable here.
    InvalidToken,
    /// Unique attribute (email, username) already taken by another record.
    AlreadyUsed,
    LoginFailed,
    BadCredentials,
    /// Insert rejected by a pre-check or the database.
    InsertionFailed,
    PasswordResetLink,
    PasswordReset,
    PasswordUpdate,
    TokenRefresh,
    Logout,
    /// Outbound mail could not be handed off.
    MailDelivery,
    /// Unclassified internal fault.
    App,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest | ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::AccessDenied => StatusCode::FORBIDDEN,
            ErrorKind::NotFound | ErrorKind::PrincipalNotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidToken => StatusCode::NOT_ACCEPTABLE,
            ErrorKind::AlreadyUsed => StatusCode::IM_USED,
            ErrorKind::LoginFailed
            | ErrorKind::BadCredentials
            | ErrorKind::InsertionFailed
            | ErrorKind::PasswordResetLink
            | ErrorKind::PasswordReset
            | ErrorKind::PasswordUpdate
            | ErrorKind::TokenRefresh
            | ErrorKind::Logout => StatusCode::EXPECTATION_FAILED,
            ErrorKind::MailDelivery => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::App => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The one error type handlers and services return.
///
/// Carries a classification and a client-safe message. Internal details
/// (database errors, hashing failures) are logged at the point of
/// conversion and never reach the message.
#[derive(Debug, Error, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Aggregate per-field validation messages into one newline-joined body.
    pub fn validation(messages: Vec<String>) -> Self {
        Self::new(ErrorKind::Validation, messages.join("\n"))
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    /// `"{resource} not found with {field} : '{value}'"`
    pub fn not_found(resource: &str, field: &str, value: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("{resource} not found with {field} : '{value}'"),
        )
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    pub fn already_used(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyUsed, message)
    }

    pub fn bad_credentials() -> Self {
        Self::new(ErrorKind::BadCredentials, "Invalid username or password")
    }

    pub fn insertion_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsertionFailed, message)
    }

    pub fn token_refresh(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenRefresh, message)
    }

    pub fn app(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::App, message)
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status();

        // Log before translating so operators see every error with its
        // classification, including ones the client only sees sanitized.
        match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(kind = ?self.kind, message = %self.message, "request failed")
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                tracing::warn!(kind = ?self.kind, message = %self.message, "dependency unavailable")
            }
            _ => tracing::info!(kind = ?self.kind, message = %self.message, "request rejected"),
        }

        let body = match self.kind {
            ErrorKind::AccessDenied => format!("Access denied: {}", self.message),
            _ => self.message,
        };

        (status, Json(ApiResponse::error(body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_table() {
        assert_eq!(ErrorKind::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::AccessDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::PrincipalNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::InvalidToken.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(ErrorKind::AlreadyUsed.status(), StatusCode::IM_USED);
        assert_eq!(
            ErrorKind::BadCredentials.status(),
            StatusCode::EXPECTATION_FAILED
        );
        assert_eq!(
            ErrorKind::InsertionFailed.status(),
            StatusCode::EXPECTATION_FAILED
        );
        assert_eq!(
            ErrorKind::TokenRefresh.status(),
            StatusCode::EXPECTATION_FAILED
        );
        assert_eq!(
            ErrorKind::MailDelivery.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ErrorKind::App.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn response_uses_error_envelope() {
        let response = ApiError::bad_request("oops").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["data"], "oops");
    }

    #[tokio::test]
    async fn access_denied_gets_prefixed() {
        let response = ApiError::access_denied("admin role required").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["data"], "Access denied: admin role required");
    }

    #[test]
    fn not_found_message_format() {
        let err = ApiError::not_found("User", "id", "123e4567");
        assert_eq!(err.message, "User not found with id : '123e4567'");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn validation_joins_messages_with_newlines() {
        let err = ApiError::validation(vec![
            "email must be a well-formed email address".to_string(),
            "username is required".to_string(),
        ]);
        assert_eq!(
            err.message,
            "email must be a well-formed email address\nusername is required"
        );
    }

    #[test]
    fn display_uses_message() {
        let err = ApiError::insertion_failed("bob already exists");
        assert_eq!(err.to_string(), "bob already exists");
    }
}
