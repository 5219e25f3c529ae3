use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    catalog::{CatalogCache, CatalogRefresher, CatalogSource, FileCatalogSource, HttpCatalogSource},
    config::{CatalogConfig, Config, CorsConfig},
    handlers::{self, AppState},
    metrics,
    signals::setup_signal_handlers,
    static_files, vehicles,
};

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Start the estimate server
///
/// This function:
/// 1. Initializes metrics
/// 2. Builds the catalog cache and performs the first load
/// 3. Sets up signal handlers for graceful shutdown and catalog reload
/// 4. Serves requests with graceful shutdown support
pub async fn start_server(config: Config) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let catalog = Arc::new(build_catalog_cache(&config.catalog)?);
    match catalog.refresh_if_stale().await {
        Ok(snapshot) => info!(
            "Catalog ready: {} categories, {} services",
            snapshot.index.categories().len(),
            snapshot.index.service_count()
        ),
        Err(e) => warn!(
            "Initial catalog load from {} failed, API will answer 503 until it loads: {}",
            catalog.source_description(),
            e
        ),
    }

    let refresher_handle = if config.catalog.refresh_interval_seconds > 0 {
        let refresher = Arc::new(CatalogRefresher::new(
            catalog.clone(),
            Duration::from_secs(config.catalog.refresh_interval_seconds),
        ));
        Some(tokio::spawn(refresher.start_background_task()))
    } else {
        None
    };

    let vehicle_source = vehicles::from_config(&config.vehicles)?;
    info!("Vehicle data provider: {}", vehicle_source.name());

    // Setup signal handlers (SIGTERM, SIGINT for shutdown; SIGHUP for catalog reload)
    let (shutdown_tx, signal_handle) = setup_signal_handlers(catalog.clone())?;
    let mut shutdown_rx = shutdown_tx.subscribe();

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let state = AppState::new(config, catalog, vehicle_source);
    let app = create_router(state, metrics_handle);

    info!("Starting shop-estimate on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    if let Some(handle) = refresher_handle {
        handle.abort();
    }
    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Build the catalog cache for the configured source
pub fn build_catalog_cache(cfg: &CatalogConfig) -> Result<CatalogCache> {
    let cache = match (&cfg.path, &cfg.url) {
        (Some(path), None) => {
            let source: Arc<dyn CatalogSource> = Arc::new(FileCatalogSource::new(path));
            CatalogCache::new(source)
        }
        (None, Some(url)) => {
            let source: Arc<dyn CatalogSource> = Arc::new(HttpCatalogSource::new(
                url,
                Duration::from_secs(cfg.timeout_seconds),
                cfg.max_retries,
            )?);
            // Each remote check downloads the document
            CatalogCache::new(source)
                .with_min_check_interval(Duration::from_secs(cfg.refresh_interval_seconds))
        }
        _ => anyhow::bail!("Exactly one of catalog.path or catalog.url must be configured"),
    };

    Ok(cache)
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState, metrics_handle: Option<Arc<PrometheusHandle>>) -> Router {
    let cors = cors_layer(&state.config.cors);
    let static_dir = state.config.static_files.dir.clone();
    let metrics_endpoint = state.config.metrics.endpoint.clone();

    let api_routes = Router::new()
        .route("/ready", get(handlers::health::readiness_check))
        .route("/categories", get(handlers::catalog::list_categories))
        .route("/services/:category_key", get(handlers::catalog::list_services))
        .route("/estimate", post(handlers::estimate::create_estimate))
        .route("/api/makes", get(handlers::vehicles::list_makes))
        .route("/api/models/:make", get(handlers::vehicles::list_models))
        .with_state(state);

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(api_routes)
        .merge(static_files::static_routes(Path::new(&static_dir)));

    if let Some(handle) = metrics_handle {
        app = app.merge(
            Router::new()
                .route(&metrics_endpoint, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        );
    }

    app.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    if cfg.allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
