//! JSON extractor with automatic validation using the validator crate.

use crate::errors::{ApiError, messages};
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Validates the request body using the `validator` crate's `Validate`
/// trait. On failure the rejection is a 400 whose body is the resolved
/// per-field messages joined with newlines, wrapped in the standard
/// error envelope.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::post;
/// use axum_helpers::extractors::ValidatedJson;
/// use serde::Deserialize;
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateUser {
///     #[validate(length(min = 3, max = 50))]
///     username: String,
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn create_user(ValidatedJson(payload): ValidatedJson<CreateUser>) -> String {
///     format!("Creating user: {}", payload.username)
/// }
///
/// let app = Router::new().route("/users", post(create_user));
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        data.validate().map_err(|e| {
            let mut resolved: Vec<String> = e
                .field_errors()
                .iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(|err| messages::resolve(field, err))
                })
                .collect();
            // Field iteration order is a HashMap's; sort for a stable body.
            resolved.sort();

            ApiError::validation(resolved)
        })?;

        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use axum::{Router, body::Body, http::Request as HttpRequest, http::StatusCode, routing::post};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct SignUp {
        #[validate(length(min = 3, max = 50))]
        username: String,
        #[validate(email)]
        email: String,
    }

    async fn handler(ValidatedJson(payload): ValidatedJson<SignUp>) -> String {
        payload.username
    }

    fn app() -> Router {
        Router::new().route("/", post(handler))
    }

    fn json_request(body: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_passes_through() {
        let response = app()
            .oneshot(json_request(
                r#"{"username":"alice","email":"alice@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_fields_aggregate_into_newline_joined_envelope() {
        let response = app()
            .oneshot(json_request(r#"{"username":"ab","email":"not-an-email"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);

        let message = json["data"].as_str().unwrap();
        let lines: Vec<&str> = message.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.contains(&"email must be a well-formed email address"));
        assert!(lines.contains(&"username length must be between 3 and 50"));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let response = app().oneshot(json_request("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rejection_kind_is_validation() {
        let err = ApiError::validation(vec!["username is required".to_string()]);
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
