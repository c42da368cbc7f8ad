use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{
        basic::{self, BasicCredentials},
        password::{self, Argon2Params},
    },
    db::handlers::Users,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::SqlitePool;
use tracing::{debug, instrument, trace};

/// Resolve Basic credentials to a user.
///
/// The password check always runs, against a dummy hash when the email is unknown, so both
/// failure modes take the same time and produce the same error.
#[instrument(skip_all, fields(email = %credentials.email))]
pub async fn authenticate(db: &SqlitePool, params: Argon2Params, credentials: BasicCredentials) -> Result<CurrentUser> {
    // Scoped so the connection is back in the pool before the handler runs
    let user = {
        let mut conn = db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        Users::new(&mut conn).get_user_by_email(&credentials.email).await?
    };

    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let supplied = credentials.password;
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => password::verify_password(&supplied, &hash),
        None => {
            password::verify_password(&supplied, password::dummy_hash(params)?)?;
            Ok(false)
        }
    })
    .await
    .map_err(|e| Error::Internal {
        operation: format!("join password verification task: {e}"),
    })??;

    match user {
        Some(user) if verified => {
            debug!(user_id = user.id, "Authenticated user");
            Ok(CurrentUser::from(user))
        }
        Some(user) => Err(Error::Unauthenticated {
            message: Some(format!("password mismatch for user {}", user.id)),
        }),
        None => Err(Error::Unauthenticated {
            message: Some(format!("no user with email {}", credentials.email)),
        }),
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let credentials = basic::extract_credentials(&parts.headers).map_err(|reason| {
            trace!("Rejecting request without usable credentials: {reason}");
            Error::Unauthenticated {
                message: Some(reason.to_string()),
            }
        })?;

        authenticate(&state.db, Argon2Params::from(&state.config.auth.password), credentials).await
    }
}
