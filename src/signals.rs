use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::catalog::CatalogCache;

/// Shutdown signal types
#[derive(Debug, Clone, Copy)]
pub enum ShutdownSignal {
    /// Graceful shutdown (drain connections, clean up)
    Graceful,
}

/// Setup signal handlers for the server
///
/// Returns a broadcast sender for shutdown signals and a join handle for the signal task
///
/// Handles:
/// - SIGTERM/SIGINT: Graceful shutdown
/// - SIGHUP: Forced catalog reload
#[cfg(unix)]
pub fn setup_signal_handlers(
    catalog: Arc<CatalogCache>,
) -> anyhow::Result<(broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("SIGTERM received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sigint.recv() => {
                    info!("SIGINT received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sighup.recv() => {
                    info!("SIGHUP received, reloading catalog");
                    reload_catalog(&catalog).await;
                }
            }
        }
    });

    Ok((shutdown_tx, handle))
}

/// Non-unix fallback: only Ctrl+C is supported
#[cfg(not(unix))]
pub fn setup_signal_handlers(
    _catalog: Arc<CatalogCache>,
) -> anyhow::Result<(broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, initiating shutdown");
                let _ = tx_clone.send(ShutdownSignal::Graceful);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    });

    Ok((shutdown_tx, handle))
}

/// Re-read the catalog regardless of its version marker.
/// On failure the current index stays in place.
pub async fn reload_catalog(catalog: &CatalogCache) -> bool {
    match catalog.force_reload().await {
        Ok(snapshot) => {
            info!(
                "Catalog reloaded (version {}, {} categories)",
                snapshot.version,
                snapshot.index.categories().len()
            );
            true
        }
        Err(e) => {
            error!("Failed to reload catalog, keeping current index: {}", e);
            false
        }
    }
}
