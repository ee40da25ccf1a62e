pub mod payload;
pub mod podcast_task;
pub mod rest;
pub mod state;

pub use rest::{generate_podcast_handler, health_handler};

use crate::config::StorageBackend;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application router, including the Swagger UI.
///
/// With the local storage backend, published episodes are also served from
/// the path of `PUBLIC_BASE_URL`.
pub fn router(app_state: Arc<AppState>) -> Router {
    let config = app_state.config.clone();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);
    let cors = match config
        .cors_allow_origin
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => cors.allow_origin(origin),
        None => cors.allow_origin(Any),
    };

    let api_router = Router::new()
        .route("/generate-podcast", post(generate_podcast_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let mut app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if config.storage_backend == StorageBackend::Local {
        let files = ServeDir::new(&config.local_storage_path);
        let mount = public_mount_path(&config.public_base_url);
        info!(
            "Serving {} at {}",
            config.local_storage_path.display(),
            mount
        );
        app = if mount == "/" {
            app.fallback_service(files)
        } else {
            app.nest_service(&mount, files)
        };
    }

    app.layer(cors).layer(TraceLayer::new_for_http())
}

/// The route prefix local objects are served under, taken from the path
/// component of the public base URL.
fn public_mount_path(public_base_url: &str) -> String {
    let path = reqwest::Url::parse(public_base_url)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| public_base_url.to_string());
    let path = path.trim_matches('/');
    format!("/{}", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_path_comes_from_the_base_url() {
        assert_eq!(public_mount_path("http://localhost:5000/public"), "/public");
        assert_eq!(public_mount_path("https://cdn.example/a/b/"), "/a/b");
        assert_eq!(public_mount_path("http://localhost:5000"), "/");
        assert_eq!(public_mount_path("files"), "/files");
    }
}
