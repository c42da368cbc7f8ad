//! Database repository for users.

use crate::db::{
    errors::Result,
    models::users::{UserCreateDBRequest, UserDBResponse},
};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email_address: user.email_address,
            password_hash: user.password_hash,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, first_name, last_name, email_address, password_hash, created_at, updated_at";

/// Users are only ever registered and looked up; there is no update or delete path.
pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(email = %request.email_address), err)]
    pub async fn create(&mut self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (first_name, last_name, email_address, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email_address)
        .bind(&request.password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(UserDBResponse::from(user))
    }

    /// Exact-match lookup used by Basic authentication
    #[instrument(skip(self), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email_address = ?"))
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    #[instrument(skip(self), err)]
    pub async fn email_exists(&mut self, email: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email_address = ?")
            .bind(email)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use sqlx::SqlitePool;

    fn create_request(email: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            first_name: "Joe".to_string(),
            last_name: "Smith".to_string(),
            email_address: email.to_string(),
            password_hash: "$argon2id$not-a-real-hash".to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo.create(&create_request("joe@smith.com")).await.unwrap();

        assert!(user.id > 0);
        assert_eq!(user.first_name, "Joe");
        assert_eq!(user.last_name, "Smith");
        assert_eq!(user.email_address, "joe@smith.com");
        assert_eq!(user.password_hash, "$argon2id$not-a-real-hash");

        let fetched = repo.get_user_by_email("joe@smith.com").await.unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert_eq!(fetched.email_address, "joe@smith.com");
        assert_eq!(fetched.created_at, user.created_at);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_user_by_email(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&create_request("sally@jones.com")).await.unwrap();

        let found = repo.get_user_by_email("sally@jones.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(repo.get_user_by_email("SALLY@jones.com").await.unwrap().is_none());
        assert!(repo.get_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_email_exists(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        assert!(!repo.email_exists("joe@smith.com").await.unwrap());
        repo.create(&create_request("joe@smith.com")).await.unwrap();
        assert!(repo.email_exists("joe@smith.com").await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_is_unique_violation(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&create_request("joe@smith.com")).await.unwrap();
        let err = repo.create(&create_request("joe@smith.com")).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(err.is_duplicate_email());
    }
}
