//! API request and response data models.
//!
//! These structs define the JSON contract of the service. Field names are camelCase on the
//! wire. Database models live separately in [`crate::db::models`] and are converted with
//! `From` impls.
//!
//! - [`users`]: registration requests, profiles and the authenticated [`users::CurrentUser`]
//! - [`courses`]: course create/update requests and course responses

pub mod courses;
pub mod users;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// A `201 Created` response with an empty body and a `Location` header
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub location: String,
}

impl Created {
    pub fn at(location: impl Into<String>) -> Self {
        Self { location: location.into() }
    }
}

impl IntoResponse for Created {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, [(header::LOCATION, self.location)]).into_response()
    }
}
