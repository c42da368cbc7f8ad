//! Request body validation.
//!
//! Handlers accept the raw JSON value, check it here, and only then deserialize into the typed
//! request model. This way every missing field is reported at once instead of serde stopping
//! at the first one.

use crate::config::PasswordConfig;
use crate::errors::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Message rendered for one missing field
pub fn missing_field_message(field: &str) -> String {
    format!("Please provide value for '{field}'")
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Check that every field in `fields` is present and non-empty.
///
/// All violations are collected in declaration order. A body that is not a JSON object
/// violates every field.
pub fn require_fields(body: &Value, fields: &[&str]) -> Result<()> {
    let object = body.as_object();
    let errors: Vec<String> = fields
        .iter()
        .filter(|field| is_missing(object.and_then(|o| o.get(**field))))
        .map(|field| missing_field_message(field))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::ValidationFailed { errors })
    }
}

/// Reject `null` and `{}` bodies
pub fn require_non_empty(body: &Value) -> Result<()> {
    let empty = match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };

    if empty {
        return Err(Error::BadRequest {
            message: "JSON data cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// Deserialize a validated body into its typed request model
pub fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| Error::BadRequest {
        message: format!("Invalid request body: {e}"),
    })
}

/// Loose structural check: one `@`, something before it, a dotted domain after it
pub fn validate_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::BadRequest {
            message: "Please provide a valid email address".to_string(),
        })
    }
}

pub fn validate_password_length(password: &str, config: &PasswordConfig) -> Result<()> {
    let length = password.chars().count();
    if length < config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", config.min_length),
        });
    }
    if length > config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at most {} characters", config.max_length),
        });
    }
    Ok(())
}
