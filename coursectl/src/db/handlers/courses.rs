//! Database repository for courses.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::courses::{CourseCreateDBRequest, CourseDBResponse, CourseOwnerDBResponse, CourseUpdateDBRequest},
};
use crate::types::{CourseId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing courses
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    /// Only return courses owned by this user
    pub user_id: Option<UserId>,
}

impl CourseFilter {
    pub fn owned_by(user_id: UserId) -> Self {
        Self { user_id: Some(user_id) }
    }
}

// A course row joined with its owner
#[derive(Debug, Clone, FromRow)]
struct CourseWithOwner {
    pub id: CourseId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub owner_email_address: String,
}

impl From<CourseWithOwner> for CourseDBResponse {
    fn from(row: CourseWithOwner) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            estimated_time: row.estimated_time,
            materials_needed: row.materials_needed,
            created_at: row.created_at,
            updated_at: row.updated_at,
            owner: CourseOwnerDBResponse {
                id: row.user_id,
                first_name: row.owner_first_name,
                last_name: row.owner_last_name,
                email_address: row.owner_email_address,
            },
        }
    }
}

const SELECT_WITH_OWNER: &str = "SELECT c.id, c.user_id, c.title, c.description, c.estimated_time, c.materials_needed,
            c.created_at, c.updated_at,
            u.first_name AS owner_first_name, u.last_name AS owner_last_name, u.email_address AS owner_email_address
     FROM courses c
     INNER JOIN users u ON u.id = c.user_id";

pub struct Courses<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Courses<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Courses<'c> {
    type CreateRequest = CourseCreateDBRequest;
    type UpdateRequest = CourseUpdateDBRequest;
    type Response = CourseDBResponse;
    type Id = CourseId;
    type Filter = CourseFilter;

    #[instrument(skip(self, request), fields(user_id = request.user_id, title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let id = sqlx::query_scalar::<_, CourseId>(
            "INSERT INTO courses (user_id, title, description, estimated_time, materials_needed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(request.user_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.estimated_time)
        .bind(&request.materials_needed)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let course = sqlx::query_as::<_, CourseWithOwner>(&format!("{SELECT_WITH_OWNER} WHERE c.id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(course.map(CourseDBResponse::from))
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let courses = sqlx::query_as::<_, CourseWithOwner>(&format!(
            "{SELECT_WITH_OWNER} WHERE (?1 IS NULL OR c.user_id = ?1) ORDER BY c.id"
        ))
        .bind(filter.user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(courses.into_iter().map(CourseDBResponse::from).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let result = sqlx::query(
            "UPDATE courses SET
                title = ?,
                description = ?,
                estimated_time = COALESCE(?, estimated_time),
                materials_needed = COALESCE(?, materials_needed),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.estimated_time)
        .bind(&request.materials_needed)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Users;
    use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
    use sqlx::SqlitePool;

    async fn create_owner(pool: &SqlitePool, email: &str) -> UserDBResponse {
        let mut conn = pool.acquire().await.unwrap();
        Users::new(&mut conn)
            .create(&UserCreateDBRequest {
                first_name: "Joe".to_string(),
                last_name: "Smith".to_string(),
                email_address: email.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    fn course_request(user_id: UserId, title: &str) -> CourseCreateDBRequest {
        CourseCreateDBRequest {
            user_id,
            title: title.to_string(),
            description: "Learn by building".to_string(),
            estimated_time: Some("12 hours".to_string()),
            materials_needed: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_course_embeds_owner(pool: SqlitePool) {
        let owner = create_owner(&pool, "joe@smith.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Courses::new(&mut conn);

        let course = repo.create(&course_request(owner.id, "Build a Basic Bookcase")).await.unwrap();

        assert_eq!(course.title, "Build a Basic Bookcase");
        assert_eq!(course.user_id, owner.id);
        assert_eq!(course.estimated_time.as_deref(), Some("12 hours"));
        assert_eq!(course.materials_needed, None);
        assert_eq!(
            course.owner,
            CourseOwnerDBResponse {
                id: owner.id,
                first_name: "Joe".to_string(),
                last_name: "Smith".to_string(),
                email_address: "joe@smith.com".to_string(),
            }
        );
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_course_for_unknown_user_fails(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Courses::new(&mut conn);

        let err = repo.create(&course_request(999, "Orphan")).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_courses_with_filter(pool: SqlitePool) {
        let joe = create_owner(&pool, "joe@smith.com").await;
        let sally = create_owner(&pool, "sally@jones.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Courses::new(&mut conn);

        repo.create(&course_request(joe.id, "First")).await.unwrap();
        repo.create(&course_request(sally.id, "Second")).await.unwrap();
        repo.create(&course_request(joe.id, "Third")).await.unwrap();

        let all = repo.list(&CourseFilter::default()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);

        let joes = repo.list(&CourseFilter::owned_by(joe.id)).await.unwrap();
        assert_eq!(joes.len(), 2);
        assert!(joes.iter().all(|c| c.owner.id == joe.id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_course_keeps_unspecified_optionals(pool: SqlitePool) {
        let owner = create_owner(&pool, "joe@smith.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Courses::new(&mut conn);
        let course = repo.create(&course_request(owner.id, "Old title")).await.unwrap();

        let updated = repo
            .update(
                course.id,
                &CourseUpdateDBRequest {
                    title: "New title".to_string(),
                    description: "New description".to_string(),
                    estimated_time: None,
                    materials_needed: Some("* Saw".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New title");
        assert_eq!(updated.description, "New description");
        assert_eq!(updated.estimated_time.as_deref(), Some("12 hours"));
        assert_eq!(updated.materials_needed.as_deref(), Some("* Saw"));
        assert_eq!(updated.user_id, owner.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_course(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Courses::new(&mut conn);

        let err = repo
            .update(
                7,
                &CourseUpdateDBRequest {
                    title: "t".to_string(),
                    description: "d".to_string(),
                    estimated_time: None,
                    materials_needed: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_course(pool: SqlitePool) {
        let owner = create_owner(&pool, "joe@smith.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Courses::new(&mut conn);
        let course = repo.create(&course_request(owner.id, "Doomed")).await.unwrap();

        assert!(repo.delete(course.id).await.unwrap());
        assert!(repo.get_by_id(course.id).await.unwrap().is_none());
        assert!(!repo.delete(course.id).await.unwrap());
    }
}
