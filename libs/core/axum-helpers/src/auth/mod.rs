//! Stateless JWT authentication: configuration, token issuing/validation,
//! the per-request authentication middleware, and identity extractors.

pub mod config;
pub mod identity;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use identity::{CurrentUser, RequireAdmin};
pub use jwt::{Claims, TokenError, TokenProvider, TokenUse};
pub use middleware::auth_middleware;
