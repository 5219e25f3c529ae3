//! Static file serving for the estimate UI
//!
//! Serves `index.html`, `/static/*` assets and the web manifest straight
//! from the configured directory on disk.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::path::{Path, PathBuf};
use tower_http::services::{ServeDir, ServeFile};
use tracing::warn;

/// Routes for the UI shell and its assets
pub fn static_routes(dir: &Path) -> Router {
    let index_path = dir.join("index.html");

    Router::new()
        .route("/", get(move || serve_index(index_path.clone())))
        .route_service(
            "/manifest.webmanifest",
            ServeFile::new(dir.join("manifest.webmanifest")),
        )
        .nest_service("/static", ServeDir::new(dir))
}

/// Serve the UI index.html
async fn serve_index(path: PathBuf) -> Response {
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            content,
        )
            .into_response(),
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!(
                    "UI not installed: missing {}. Create it in the static directory.",
                    path.display()
                ),
            )
                .into_response()
        }
    }
}
