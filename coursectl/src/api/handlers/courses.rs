use crate::{
    AppState,
    api::{
        extractors::{CourseIdPath, JsonBody},
        models::{
            Created,
            courses::{CourseCreate, CourseResponse, CourseUpdate, ListCoursesQuery},
            users::CurrentUser,
        },
        validation,
    },
    auth::permissions::require_course_owner,
    db::{
        errors::DbError,
        handlers::{Courses, Repository, courses::CourseFilter},
        models::courses::{CourseCreateDBRequest, CourseUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{CourseId, Operation},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;

fn course_not_found(id: CourseId) -> Error {
    Error::NotFound {
        resource: "Course".to_string(),
        id: id.to_string(),
    }
}

/// List all courses with their owners.
#[utoipa::path(
    get,
    path = "/courses",
    tag = "courses",
    summary = "List courses",
    params(ListCoursesQuery),
    responses(
        (status = 200, description = "All courses, each with its owner", body = [CourseResponse]),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_courses(State(state): State<AppState>, Query(query): Query<ListCoursesQuery>) -> Result<Json<Vec<CourseResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let filter = query.user_id.map(CourseFilter::owned_by).unwrap_or_default();

    let courses = Courses::new(&mut conn).list(&filter).await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// Get a single course with its owner.
#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "courses",
    summary = "Get course",
    params(
        ("id" = i64, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "The course", body = CourseResponse),
        (status = 404, description = "No course with this ID"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all, fields(course_id = id))]
pub async fn get_course(State(state): State<AppState>, CourseIdPath(id): CourseIdPath) -> Result<Json<CourseResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let course = Courses::new(&mut conn).get_by_id(id).await?.ok_or_else(|| course_not_found(id))?;
    Ok(Json(CourseResponse::from(course)))
}

/// Create a course owned by the authenticated user.
#[utoipa::path(
    post,
    path = "/courses",
    tag = "courses",
    summary = "Create course",
    description = "Create a course. `userId` must be the ID of the authenticated user. Responds with an empty body and a `Location` header pointing at the new course.",
    request_body = CourseCreate,
    responses(
        (status = 201, description = "Course created"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "userId is not the authenticated user"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn create_course(State(state): State<AppState>, current_user: CurrentUser, JsonBody(body): JsonBody) -> Result<Created> {
    validation::require_fields(&body, CourseCreate::REQUIRED_FIELDS)?;
    let request: CourseCreate = validation::parse_body(body)?;
    require_course_owner(&current_user, request.user_id, Operation::Create)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let course = Courses::new(&mut tx).create(&CourseCreateDBRequest::from(request)).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    info!(course_id = course.id, "Created course");
    Ok(Created::at(format!("/courses/{}", course.id)))
}

/// Update a course. Only its owner may do this.
#[utoipa::path(
    put,
    path = "/courses/{id}",
    tag = "courses",
    summary = "Update course",
    description = "Replace the title and description of a course. `estimatedTime` and `materialsNeeded` are only changed when present.",
    params(
        ("id" = i64, Path, description = "Course ID"),
    ),
    request_body = CourseUpdate,
    responses(
        (status = 204, description = "Course updated"),
        (status = 400, description = "Empty body or missing fields"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Authenticated user does not own the course"),
        (status = 404, description = "No course with this ID"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, course_id = id))]
pub async fn update_course(
    State(state): State<AppState>,
    current_user: CurrentUser,
    CourseIdPath(id): CourseIdPath,
    JsonBody(body): JsonBody,
) -> Result<StatusCode> {
    validation::require_non_empty(&body)?;
    validation::require_fields(&body, CourseUpdate::REQUIRED_FIELDS)?;
    let request: CourseUpdate = validation::parse_body(body)?;

    // Autocommit statements: the owner never changes, and a course deleted between the two
    // statements makes the update miss and report not found
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Courses::new(&mut conn);

    let course = repo.get_by_id(id).await?.ok_or_else(|| course_not_found(id))?;
    require_course_owner(&current_user, course.user_id, Operation::Update)?;

    repo.update(id, &CourseUpdateDBRequest::from(request)).await.map_err(|e| match e {
        DbError::NotFound => course_not_found(id),
        e => Error::Database(e),
    })?;

    info!("Updated course");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a course. Only its owner may do this.
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    tag = "courses",
    summary = "Delete course",
    params(
        ("id" = i64, Path, description = "Course ID"),
    ),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Authenticated user does not own the course"),
        (status = 404, description = "No course with this ID"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, course_id = id))]
pub async fn delete_course(State(state): State<AppState>, current_user: CurrentUser, CourseIdPath(id): CourseIdPath) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Courses::new(&mut conn);

    let course = repo.get_by_id(id).await?.ok_or_else(|| course_not_found(id))?;
    require_course_owner(&current_user, course.user_id, Operation::Delete)?;

    if !repo.delete(id).await? {
        return Err(course_not_found(id));
    }

    info!("Deleted course");
    Ok(StatusCode::NO_CONTENT)
}
