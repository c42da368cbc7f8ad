//! Database models for courses.

use crate::api::models::courses::{CourseCreate, CourseUpdate};
use crate::types::{CourseId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new course
#[derive(Debug, Clone)]
pub struct CourseCreateDBRequest {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
}

impl From<CourseCreate> for CourseCreateDBRequest {
    fn from(api: CourseCreate) -> Self {
        Self {
            user_id: api.user_id,
            title: api.title,
            description: api.description,
            estimated_time: api.estimated_time,
            materials_needed: api.materials_needed,
        }
    }
}

/// Database request for updating a course.
///
/// `None` on an optional column leaves the stored value untouched.
#[derive(Debug, Clone)]
pub struct CourseUpdateDBRequest {
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
}

impl From<CourseUpdate> for CourseUpdateDBRequest {
    fn from(api: CourseUpdate) -> Self {
        Self {
            title: api.title,
            description: api.description,
            estimated_time: api.estimated_time,
            materials_needed: api.materials_needed,
        }
    }
}

/// The owning user as embedded in course responses. Never carries the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseOwnerDBResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

/// Database response for a course
#[derive(Debug, Clone)]
pub struct CourseDBResponse {
    pub id: CourseId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: CourseOwnerDBResponse,
}
