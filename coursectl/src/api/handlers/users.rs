use crate::{
    AppState,
    api::{
        extractors::JsonBody,
        models::{
            Created,
            users::{CurrentUser, UserCreate, UserResponse},
        },
        validation,
    },
    auth::password::{self, Argon2Params},
    db::{handlers::Users, models::users::UserCreateDBRequest},
    errors::{Error, Result},
};
use axum::{extract::State, response::Json};
use tracing::info;

/// Return the profile of the authenticated user.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "Get current user",
    description = "Return the profile of the user identified by the Basic credentials. The password hash is never included.",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid credentials"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn get_current_user(current_user: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(current_user))
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Register user",
    description = "Create a user account. Responds with an empty body and `Location: /`.",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Missing fields, invalid email or password, or email already in use"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(State(state): State<AppState>, JsonBody(body): JsonBody) -> Result<Created> {
    validation::require_fields(&body, UserCreate::REQUIRED_FIELDS)?;
    let request: UserCreate = validation::parse_body(body)?;
    validation::validate_email(&request.email_address)?;
    validation::validate_password_length(&request.password, &state.config.auth.password)?;

    {
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        if Users::new(&mut conn).email_exists(&request.email_address).await? {
            return Err(Error::DuplicateEmail);
        }
    }

    // No connection is held while hashing
    let params = Argon2Params::from(&state.config.auth.password);
    let plaintext = request.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext, params))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("join password hashing task: {e}"),
        })??;

    // A single INSERT: a registration that raced past the check above hits the UNIQUE constraint
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            first_name: request.first_name,
            last_name: request.last_name,
            email_address: request.email_address,
            password_hash,
        })
        .await
        .map_err(|e| if e.is_duplicate_email() { Error::DuplicateEmail } else { Error::Database(e) })?;

    info!(user_id = user.id, "Registered new user");
    Ok(Created::at("/"))
}
