//! Request extractors that report failures through [`Error`] instead of axum's plain-text
//! rejections.

use crate::{
    errors::{Error, Result},
    types::CourseId,
};
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde_json::Value;

/// A request body parsed as JSON.
///
/// An absent or blank body becomes `Value::Null`, so it goes through the same required-field
/// and empty-body checks as `{}`. The `Content-Type` header is not consulted.
#[derive(Debug)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| Error::BadRequest {
            message: e.body_text(),
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Value::Null));
        }

        serde_json::from_slice(&bytes).map(Self).map_err(|e| Error::BadRequest {
            message: format!("Invalid JSON body: {e}"),
        })
    }
}

/// The `{id}` segment of a course route. A segment that is not a course ID cannot name an
/// existing course, so it is reported as not found.
#[derive(Debug, Clone, Copy)]
pub struct CourseIdPath(pub CourseId);

impl<S> FromRequestParts<S> for CourseIdPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::BadRequest { message: e.body_text() })?;

        raw.parse().map(Self).map_err(|_| Error::NotFound {
            resource: "Course".to_string(),
            id: raw,
        })
    }
}
