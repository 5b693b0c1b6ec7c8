use crate::api::handlers;
use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "oidportal",
        description = "OpenID sign-in portal with profile persistence"
    ),
    paths(
        handlers::index::index,
        handlers::login::login,
        handlers::login::submit,
        handlers::create_profile::form,
        handlers::create_profile::submit,
        handlers::profile::form,
        handlers::profile::submit,
        handlers::logout::logout,
        handlers::health::health,
    ),
    components(schemas(handlers::health::Health)),
    tags(
        (name = "pages", description = "HTML pages"),
        (name = "auth", description = "OpenID login handshake"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// The generated `OpenAPI` document.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

// axum handler for /openapi.json
pub async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = openapi();
        for path in [
            "/",
            "/login",
            "/create-profile",
            "/profile",
            "/logout",
            "/health",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path in OpenAPI doc: {path}"
            );
        }
    }
}
