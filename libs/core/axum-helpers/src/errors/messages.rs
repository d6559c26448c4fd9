//! English message catalog for validation failures.
//!
//! Field-level errors coming out of the `validator` derive carry a code
//! (`email`, `length`, `range`, ...) and optional params; this module turns
//! them into the client-facing sentences joined into the 400 body.

use validator::ValidationError;

/// Resolve one field error to its client-facing message.
///
/// An explicit `#[validate(..., message = "...")]` wins; otherwise the
/// message is derived from the error code and its parameters.
pub fn resolve(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    match error.code.as_ref() {
        "email" => format!("{field} must be a well-formed email address"),
        "url" => format!("{field} must be a valid URL"),
        "length" => {
            let min = param(error, "min");
            let max = param(error, "max");
            match (min, max) {
                (Some(min), Some(max)) => {
                    format!("{field} length must be between {min} and {max}")
                }
                (Some(min), None) => format!("{field} length must be at least {min}"),
                (None, Some(max)) => format!("{field} length must be at most {max}"),
                (None, None) => format!("{field} has an invalid length"),
            }
        }
        "range" => {
            let min = param(error, "min");
            let max = param(error, "max");
            match (min, max) {
                (Some(min), Some(max)) => format!("{field} must be between {min} and {max}"),
                (Some(min), None) => format!("{field} must be at least {min}"),
                (None, Some(max)) => format!("{field} must be at most {max}"),
                (None, None) => format!("{field} is out of range"),
            }
        }
        "required" => format!("{field} is required"),
        _ => format!("{field} is invalid"),
    }
}

fn param(error: &ValidationError, name: &str) -> Option<String> {
    error.params.get(name).map(|value| {
        // Numeric params render without quotes; strings without escapes.
        match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn explicit_message_wins() {
        let mut error = ValidationError::new("length");
        error.message = Some(Cow::Borrowed("username is too short"));
        assert_eq!(resolve("username", &error), "username is too short");
    }

    #[test]
    fn email_code() {
        let error = ValidationError::new("email");
        assert_eq!(
            resolve("email", &error),
            "email must be a well-formed email address"
        );
    }

    #[test]
    fn length_with_bounds() {
        let mut error = ValidationError::new("length");
        error.add_param(Cow::Borrowed("min"), &3);
        error.add_param(Cow::Borrowed("max"), &50);
        assert_eq!(
            resolve("username", &error),
            "username length must be between 3 and 50"
        );
    }

    #[test]
    fn unknown_code_falls_back() {
        let error = ValidationError::new("custom_rule");
        assert_eq!(resolve("field", &error), "field is invalid");
    }
}
