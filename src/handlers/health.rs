use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::AppState;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "ok",
        "service": "shop-estimate",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Returns 200 OK once a catalog index is loaded, 503 before that
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.snapshot() {
        Some(snapshot) => (StatusCode::OK, Json(json!({
            "status": "ready",
            "catalog": {
                "source": state.catalog.source_description(),
                "version": snapshot.version.as_str(),
                "loaded_at": snapshot.loaded_at,
                "categories": snapshot.index.categories().len(),
                "services": snapshot.index.service_count(),
            },
        }))),
        None => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({
            "status": "not_ready",
            "reason": "catalog not loaded",
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogCache, InMemoryCatalogSource};
    use crate::config::Config;
    use crate::vehicles::StaticVehicleSource;
    use std::sync::Arc;

    fn state(catalog: &str) -> AppState {
        let cache = CatalogCache::new(Arc::new(InMemoryCatalogSource::new(catalog)));
        AppState::new(
            Config::default(),
            Arc::new(cache),
            Arc::new(StaticVehicleSource::builtin()),
        )
    }

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_waits_for_catalog() {
        let state = state(r#"[{"category": "Brakes", "service": "Pads"}]"#);

        let response = readiness_check(State(state.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.catalog.refresh_if_stale().await.unwrap();
        let response = readiness_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
