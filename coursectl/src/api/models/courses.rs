//! API request/response models for courses.

use super::users::UserResponse;
use crate::db::models::courses::CourseDBResponse;
use crate::types::{CourseId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Course creation request. `userId` must be the authenticated caller.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseCreate {
    #[schema(example = "Build a Basic Bookcase")]
    pub title: String,
    pub description: String,
    #[schema(example = "12 hours")]
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    #[schema(value_type = i64)]
    pub user_id: UserId,
}

impl CourseCreate {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["title", "description", "userId"];
}

/// Course update request. Omitted optional fields keep their stored values.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
}

impl CourseUpdate {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["title", "description"];
}

/// Query parameters for listing courses
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListCoursesQuery {
    /// Only return courses owned by this user
    #[param(value_type = Option<i64>)]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    #[schema(value_type = i64)]
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    /// The owning user
    pub user: UserResponse,
}

impl From<CourseDBResponse> for CourseResponse {
    fn from(db: CourseDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            description: db.description,
            estimated_time: db.estimated_time,
            materials_needed: db.materials_needed,
            user: db.owner.into(),
        }
    }
}
