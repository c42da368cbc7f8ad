//! Test fixtures shared by the unit and HTTP tests.

use crate::{
    AppState,
    auth::{
        basic,
        password::{self, Argon2Params},
    },
    config::{AuthConfig, Config, DatabaseConfig, PasswordConfig, PoolSettings},
    db::{
        handlers::{Courses, Repository, Users},
        models::{
            courses::{CourseCreateDBRequest, CourseDBResponse},
            users::{UserCreateDBRequest, UserDBResponse},
        },
    },
    types::UserId,
};
use axum_test::TestServer;
use sqlx::SqlitePool;

/// Password given to every user made by [`create_test_user`]
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool: PoolSettings {
                max_connections: 1,
                ..Default::default()
            },
        },
        auth: AuthConfig {
            // Cheap hashing keeps the suite fast
            password: PasswordConfig {
                argon2_memory_kib: 128,
                argon2_iterations: 1,
                argon2_parallelism: 1,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn create_test_state(pool: SqlitePool) -> AppState {
    AppState::builder().db(pool).config(create_test_config()).build()
}

pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    crate::Application::new_with_pool(create_test_config(), Some(pool))
        .await
        .expect("Failed to create application")
        .into_test_server()
}

/// `Authorization` header value for the given credentials
pub fn basic_auth(email: &str, password: &str) -> String {
    basic::encode_credentials(email, password)
}

/// Insert a user whose password is [`TEST_PASSWORD`]
pub async fn create_test_user(pool: &SqlitePool, email: &str) -> UserDBResponse {
    let params = Argon2Params::from(&create_test_config().auth.password);
    let password_hash = password::hash_password(TEST_PASSWORD, params).expect("Failed to hash test password");
    let local_part = email.split('@').next().unwrap_or(email);

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            first_name: "Test".to_string(),
            last_name: local_part.to_string(),
            email_address: email.to_string(),
            password_hash,
        })
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_course(pool: &SqlitePool, owner: UserId, title: &str) -> CourseDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Courses::new(&mut conn)
        .create(&CourseCreateDBRequest {
            user_id: owner,
            title: title.to_string(),
            description: format!("All about {title}"),
            estimated_time: None,
            materials_needed: None,
        })
        .await
        .expect("Failed to create test course")
}
