//! Common type definitions.
//!
//! Entity identifiers are the integer row ids assigned by SQLite, wrapped in type aliases so
//! signatures read in terms of the entity they refer to:
//!
//! - [`UserId`]: User account identifier
//! - [`CourseId`]: Course identifier
//!
//! [`Operation`] names the mutating actions that the ownership check guards.

use std::fmt;

// Type aliases for IDs
pub type UserId = i64;
pub type CourseId = i64;

/// A mutating action on an owned resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}
