//! HTTP API: request/response models, body validation and route handlers.

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod validation;
