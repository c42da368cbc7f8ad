use crate::db::errors::DbError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

/// Message returned for every failed authentication, whatever the underlying reason
pub const ACCESS_DENIED_MESSAGE: &str = "Access Denied: Invalid Credentials";

/// Message returned when a registration reuses an email address
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already in use. Please provide a unique email.";

#[derive(ThisError, Debug)]
pub enum Error {
    /// One or more required fields were missing from the request body
    #[error("Validation failed: {}", errors.join(", "))]
    ValidationFailed { errors: Vec<String> },

    /// Registration attempted with an email address that is already taken
    #[error("Email address already in use")]
    DuplicateEmail,

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Authentication required but missing or invalid. The message is only logged.
    #[error("Not authenticated: {}", message.as_deref().unwrap_or("no reason given"))]
    Unauthenticated { message: Option<String> },

    /// Authenticated user is not allowed to touch the resource
    #[error("{message}")]
    Forbidden { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::ValidationFailed { .. } | Error::DuplicateEmail | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } if db_err.is_duplicate_email() => StatusCode::BAD_REQUEST,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::ValidationFailed { errors } => errors.join(", "),
            Error::DuplicateEmail => DUPLICATE_EMAIL_MESSAGE.to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Unauthenticated { .. } => ACCESS_DENIED_MESSAGE.to_string(),
            Error::Forbidden { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { .. } if db_err.is_duplicate_email() => DUPLICATE_EMAIL_MESSAGE.to_string(),
                DbError::UniqueViolation { .. } => "Resource already exists".to_string(),
                DbError::ForeignKeyViolation { .. } => "Invalid reference to related resource".to_string(),
                DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
                DbError::Other(_) => "Internal server error".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } => {
                tracing::warn!("Authentication failed: {}", self);
            }
            Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::ValidationFailed { .. } | Error::DuplicateEmail | Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = match &self {
            Error::ValidationFailed { errors } => json!({ "errors": errors }),
            _ => json!({ "message": self.user_message() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: Error) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_errors_are_listed() {
        let (status, body) = body_json(Error::ValidationFailed {
            errors: vec![
                "Please provide value for 'title'".to_string(),
                "Please provide value for 'description'".to_string(),
            ],
        })
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "errors": ["Please provide value for 'title'", "Please provide value for 'description'"] })
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_hides_reason() {
        let (status, body) = body_json(Error::Unauthenticated {
            message: Some("No user with email nobody@example.com".to_string()),
        })
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "message": ACCESS_DENIED_MESSAGE }));
    }

    #[tokio::test]
    async fn test_internal_errors_are_generic() {
        let (status, body) = body_json(Error::Other(anyhow::anyhow!("disk on fire"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal server error" }));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::DuplicateEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::Forbidden {
                message: "nope".to_string()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::NotFound {
                resource: "Course".to_string(),
                id: "7".to_string()
            }
            .user_message(),
            "Course with ID 7 not found"
        );
        assert_eq!(Error::Database(DbError::NotFound).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_racing_duplicate_email_maps_to_bad_request() {
        let err = Error::Database(DbError::UniqueViolation {
            constraint: None,
            table: None,
            message: "UNIQUE constraint failed: users.email_address".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), DUPLICATE_EMAIL_MESSAGE);
    }
}
