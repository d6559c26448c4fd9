//! Query-string extractor whose rejection goes through the error
//! translator.

use crate::errors::ApiError;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

/// Drop-in replacement for `axum::extract::Query`.
///
/// A query string that fails to deserialize rejects with a 400 in the
/// standard error envelope instead of axum's plain-text body.
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AxumQuery(value) = AxumQuery::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        Ok(Query(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Paging {
        #[serde(default)]
        limit: usize,
    }

    async fn handler(Query(paging): Query<Paging>) -> String {
        paging.limit.to_string()
    }

    fn app() -> Router {
        Router::new().route("/items", get(handler))
    }

    #[tokio::test]
    async fn valid_query_passes_through() {
        let response = app()
            .oneshot(Request::get("/items?limit=5").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unparseable_query_is_a_400_envelope() {
        let response = app()
            .oneshot(
                Request::get("/items?limit=lots")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert!(!json["data"].as_str().unwrap().is_empty());
    }
}
