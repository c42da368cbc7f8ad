//! OpenAPI documentation for the users and courses API.
//!
//! The document is served as JSON at `/api-docs/openapi.json` and rendered with Scalar at
//! `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Registers the Basic-Auth scheme referenced by protected routes.
struct BasicAuthAddon;

impl Modify for BasicAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.security_schemes.insert(
            "BasicAuth".to_string(),
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Basic)
                    .description(Some(
                        "Send the registered email address and password on every request:\n\n\
                        ```\nAuthorization: Basic base64(emailAddress:password)\n```",
                    ))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "coursectl",
        description = "Register users and manage the courses they own."
    ),
    servers(
        (url = "/", description = "Root mount"),
        (url = "/api", description = "Same routes under the /api prefix")
    ),
    modifiers(&BasicAuthAddon),
    paths(
        api::handlers::users::get_current_user,
        api::handlers::users::create_user,
        api::handlers::courses::list_courses,
        api::handlers::courses::get_course,
        api::handlers::courses::create_course,
        api::handlers::courses::update_course,
        api::handlers::courses::delete_course,
    ),
    components(
        schemas(
            api::models::users::UserCreate,
            api::models::users::UserResponse,
            api::models::courses::CourseCreate,
            api::models::courses::CourseUpdate,
            api::models::courses::CourseResponse,
        )
    ),
    tags(
        (name = "users", description = "Registration and the authenticated user's profile"),
        (name = "courses", description = "Courses and their owners"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        assert!(paths.contains(&"/users".to_string()));
        assert!(paths.contains(&"/courses".to_string()));
        assert!(paths.contains(&"/courses/{id}".to_string()));
    }

    #[test]
    fn test_basic_auth_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        assert!(components.security_schemes.contains_key("BasicAuth"));
        assert!(components.schemas.contains_key("CourseResponse"));
    }
}
