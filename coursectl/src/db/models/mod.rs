//! Database record models matching table schemas.
//!
//! Repositories accept `*CreateDBRequest` / `*UpdateDBRequest` structs and return
//! `*DBResponse` structs. These are kept separate from the API models in
//! [`crate::api::models`] so the storage and wire representations can evolve independently;
//! conversions between the two are `From` impls on the API side.
//!
//! - [`users`]: registered accounts and their password hashes
//! - [`courses`]: courses together with the summary of their owner

pub mod courses;
pub mod users;
