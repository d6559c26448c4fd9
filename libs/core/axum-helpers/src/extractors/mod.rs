//! Custom extractors for Axum handlers.
//!
//! This module provides reusable extractors that reduce boilerplate
//! and standardize error handling across your API. All of them reject
//! through [`crate::errors::ApiError`], so malformed input never
//! produces a body outside the standard envelope.

pub mod path;
pub mod query;
pub mod validated_json;

pub use path::Path;
pub use query::Query;
pub use validated_json::ValidatedJson;
