//! API request/response models for users.

use crate::db::models::{courses::CourseOwnerDBResponse, users::UserDBResponse};
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    #[schema(example = "Joe")]
    pub first_name: String,
    #[schema(example = "Smith")]
    pub last_name: String,
    #[schema(example = "joe@smith.com")]
    pub email_address: String,
    #[schema(example = "joepassword")]
    pub password: String,
}

impl UserCreate {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["firstName", "lastName", "emailAddress", "password"];
}

/// Public view of a user. Used for the profile endpoint and as the owner embedded in courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(value_type = i64)]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

/// The user resolved from a request's Basic credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[schema(value_type = i64)]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            first_name: db.first_name,
            last_name: db.last_name,
            email_address: db.email_address,
        }
    }
}

impl From<CurrentUser> for UserResponse {
    fn from(user: CurrentUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email_address: user.email_address,
        }
    }
}

impl From<CourseOwnerDBResponse> for UserResponse {
    fn from(owner: CourseOwnerDBResponse) -> Self {
        Self {
            id: owner.id,
            first_name: owner.first_name,
            last_name: owner.last_name,
            email_address: owner.email_address,
        }
    }
}
