//! Ownership checks for course mutations.

use crate::{
    api::models::users::CurrentUser,
    errors::{Error, Result},
    types::{Operation, UserId},
};
use tracing::debug;

fn denial_message(operation: Operation) -> &'static str {
    match operation {
        Operation::Create => "You can only create courses for your own account.",
        Operation::Update => "You do not have the authorization to make changes to this course.",
        Operation::Delete => "You do not have the authorization to remove this course.",
    }
}

/// Allow the operation only when the authenticated user is the course owner
pub fn require_course_owner(user: &CurrentUser, owner_id: UserId, operation: Operation) -> Result<()> {
    if user.id == owner_id {
        return Ok(());
    }

    debug!(user_id = user.id, owner_id, %operation, "Denying course operation to non-owner");
    Err(Error::Forbidden {
        message: denial_message(operation).to_string(),
    })
}
