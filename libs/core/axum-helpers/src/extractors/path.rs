//! Path extractor whose rejection goes through the error translator.

use crate::errors::ApiError;
use axum::extract::{FromRequestParts, Path as AxumPath};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

/// Drop-in replacement for `axum::extract::Path`.
///
/// A path segment that fails to parse (a malformed UUID, a non-numeric
/// id) rejects with a 400 in the standard error envelope instead of
/// axum's plain-text body.
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AxumPath(value) = AxumPath::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        Ok(Path(value))
    }
}
