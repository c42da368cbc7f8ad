//! Authentication and authorization.
//!
//! Every protected request carries `Authorization: Basic base64(email:password)`. Nothing is
//! remembered between requests: no session or token is issued, and each request is checked
//! against the stored argon2 hash again.
//!
//! - [`basic`]: decoding the Basic header
//! - [`password`]: argon2id hashing and verification
//! - [`current_user`]: the [`CurrentUser`](crate::api::models::users::CurrentUser) extractor
//! - [`permissions`]: the ownership check guarding course mutations
//!
//! # Usage in Handlers
//!
//! Taking `CurrentUser` as a handler argument is all a route needs to be protected. The
//! extractor runs before the body is read, so unauthenticated requests are rejected with 401
//! before validation or any query.
//!
//! ```ignore
//! async fn handler(current_user: CurrentUser) -> Json<UserResponse> {
//!     Json(current_user.into())
//! }
//! ```

pub mod basic;
pub mod current_user;
pub mod password;
pub mod permissions;
