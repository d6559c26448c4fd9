//! JWT configuration, loaded the same way as the other `FromEnv` configs.

use crate::auth::jwt::{ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
use core_config::{ConfigError, FromEnv, env_or_default, env_required};

/// JWT authentication configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - Must be at least 32 characters for security
/// - `JWT_ACCESS_TTL_SECS` - access token lifetime, defaults to 900
/// - `JWT_REFRESH_TTL_SECS` - refresh token lifetime, defaults to 604800
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// JWT signing secret (minimum 32 characters)
    pub secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl JwtConfig {
    /// Create a new JwtConfig with the given secret and default TTLs.
    ///
    /// # Panics
    /// Panics if the secret is less than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= 32,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            access_ttl_secs: ACCESS_TOKEN_TTL,
            refresh_ttl_secs: REFRESH_TOKEN_TTL,
        }
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        let access_ttl_secs = env_or_default("JWT_ACCESS_TTL_SECS", &ACCESS_TOKEN_TTL.to_string())
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "JWT_ACCESS_TTL_SECS".to_string(),
                details: format!("{e}"),
            })?;

        let refresh_ttl_secs =
            env_or_default("JWT_REFRESH_TTL_SECS", &REFRESH_TOKEN_TTL.to_string())
                .parse()
                .map_err(|e| ConfigError::ParseError {
                    key: "JWT_REFRESH_TTL_SECS".to_string(),
                    details: format!("{e}"),
                })?;

        Ok(Self {
            secret,
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn new_valid() {
        let config = JwtConfig::new(SECRET);
        assert_eq!(config.secret, SECRET);
        assert_eq!(config.access_ttl_secs, 900);
        assert_eq!(config.refresh_ttl_secs, 604_800);
    }

    #[test]
    #[should_panic(expected = "JWT secret must be at least 32 characters")]
    fn new_too_short() {
        JwtConfig::new("short");
    }

    #[test]
    fn from_env_valid() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("JWT_ACCESS_TTL_SECS", Some("60")),
                ("JWT_REFRESH_TTL_SECS", None),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, SECRET);
                assert_eq!(config.access_ttl_secs, 60);
                assert_eq!(config.refresh_ttl_secs, 604_800);
            },
        );
    }

    #[test]
    fn from_env_missing_secret() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn from_env_secret_too_short() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("32 characters"));
        });
    }
}
