//! HTTP request handlers, organized by resource.
//!
//! Each handler is a short pipeline: authenticate (by taking a
//! [`CurrentUser`](crate::api::models::users::CurrentUser) argument), validate the body with
//! [`crate::api::validation`], run the repository calls, check ownership where the route
//! mutates a course, and build the response. Failures are returned as
//! [`crate::errors::Error`], which renders its own status code and JSON body.
//!
//! - [`users`]: registration and the authenticated user's profile
//! - [`courses`]: course listing, lookup, creation, update and deletion

pub mod courses;
pub mod users;
