//! OpenAPI documentation for the `/v1` API.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("Opaque token")
                        .description(Some(
                            "Authentication token from `POST /tokens/authentication`. Include it in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Greenlight",
        description = "A JSON API for a movie catalog. Reading and editing movies requires an activated account."
    ),
    servers(
        (url = "/v1", description = "Greenlight API")
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::healthcheck::healthcheck,
        api::handlers::movies::list_movies,
        api::handlers::movies::create_movie,
        api::handlers::movies::show_movie,
        api::handlers::movies::update_movie,
        api::handlers::movies::delete_movie,
        api::handlers::users::register_user,
        api::handlers::users::activate_user,
        api::handlers::tokens::create_authentication_token,
    ),
    components(
        schemas(
            api::models::MessageResponse,
            api::models::healthcheck::HealthcheckResponse,
            api::models::healthcheck::SystemInfo,
            api::models::movies::MovieCreate,
            api::models::movies::MovieUpdate,
            api::models::movies::MovieResponse,
            api::models::movies::MovieEnvelope,
            api::models::movies::MoviesEnvelope,
            api::models::pagination::PaginationMetadata,
            api::models::users::RegisterRequest,
            api::models::users::ActivateRequest,
            api::models::users::UserResponse,
            api::models::users::UserEnvelope,
            api::models::tokens::LoginRequest,
            api::models::tokens::TokenResponse,
            api::models::tokens::AuthenticationTokenEnvelope,
        )
    ),
    tags(
        (name = "healthcheck", description = "Service status"),
        (name = "movies", description = "The movie catalog"),
        (name = "users", description = "Account registration and activation"),
        (name = "tokens", description = "Authentication tokens"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route() {
        let spec = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/movies",
            "/movies/{id}",
            "/users",
            "/users/activated",
            "/tokens/authentication",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }

        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerAuth"));
    }
}
