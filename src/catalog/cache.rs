//! Cached catalog index with lazy, version-driven invalidation

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::CatalogLoadError;
use super::model::CatalogIndex;
use super::normalize::parse_catalog;
use super::source::{CatalogSource, SourceLoad, SourceVersion};
use crate::metrics;

/// An index together with the source version it was built from
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub version: SourceVersion,
    pub index: Arc<CatalogIndex>,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Default)]
struct RebuildState {
    /// Version whose content failed to normalize; not retried until it changes
    failed: Option<SourceVersion>,
    last_error: Option<String>,
    last_checked: Option<Instant>,
}

enum Rebuild {
    Current(Arc<CatalogSnapshot>),
    Installed(Arc<CatalogSnapshot>),
}

/// Owns `(version, index)` for one catalog source.
///
/// Readers load the current snapshot without blocking. Rebuilds are
/// serialized by a mutex and the new snapshot is swapped in only after the
/// document normalized successfully, so a bad reload never replaces a good
/// index.
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    current: ArcSwapOption<CatalogSnapshot>,
    rebuild: Mutex<RebuildState>,
    min_check_interval: Duration,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            current: ArcSwapOption::empty(),
            rebuild: Mutex::new(RebuildState::default()),
            min_check_interval: Duration::ZERO,
        }
    }

    /// Skip polling the source when it was checked less than `interval` ago.
    ///
    /// Remote sources download the whole document to compare versions, so
    /// request-driven checks are throttled for them.
    pub fn with_min_check_interval(mut self, interval: Duration) -> Self {
        self.min_check_interval = interval;
        self
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Current snapshot, if any was ever loaded. Performs no I/O.
    pub fn snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        self.current.load_full()
    }

    /// Current index, rebuilt first if the source changed
    pub async fn index(&self) -> Result<Arc<CatalogIndex>, CatalogLoadError> {
        self.refresh_if_stale().await.map(|snapshot| snapshot.index.clone())
    }

    /// Return an up-to-date snapshot, rebuilding when the source version moved.
    ///
    /// While another task is rebuilding, callers with a snapshot get the
    /// existing one immediately. A failed rebuild falls back to the previous
    /// snapshot; the error surfaces only when nothing was ever loaded.
    pub async fn refresh_if_stale(&self) -> Result<Arc<CatalogSnapshot>, CatalogLoadError> {
        let mut state = match self.rebuild.try_lock() {
            Ok(guard) => guard,
            Err(_) => match self.current.load_full() {
                Some(snapshot) => return Ok(snapshot),
                None => self.rebuild.lock().await,
            },
        };

        let current = self.current.load_full();
        if let (Some(snapshot), Some(checked)) = (&current, state.last_checked) {
            if checked.elapsed() < self.min_check_interval {
                return Ok(snapshot.clone());
            }
        }

        match self.rebuild_locked(&mut state, current.clone(), false).await {
            Ok(Rebuild::Current(snapshot)) | Ok(Rebuild::Installed(snapshot)) => Ok(snapshot),
            Err(e) => match current {
                Some(previous) => {
                    warn!(
                        source = %self.source.describe(),
                        version = %previous.version,
                        error = %e,
                        "Catalog reload failed, keeping previous index"
                    );
                    Ok(previous)
                }
                None => Err(e),
            },
        }
    }

    /// Poll the source once, waiting for any rebuild in progress.
    ///
    /// Returns `true` when a new index was installed.
    pub async fn check_source(&self) -> Result<bool, CatalogLoadError> {
        let mut state = self.rebuild.lock().await;
        let current = self.current.load_full();

        match self.rebuild_locked(&mut state, current, false).await? {
            Rebuild::Installed(_) => Ok(true),
            Rebuild::Current(_) => Ok(false),
        }
    }

    /// Re-read and re-normalize the source regardless of its version.
    ///
    /// On failure the previous snapshot stays in place and the error is
    /// returned to the caller.
    pub async fn force_reload(&self) -> Result<Arc<CatalogSnapshot>, CatalogLoadError> {
        let mut state = self.rebuild.lock().await;
        let current = self.current.load_full();

        match self.rebuild_locked(&mut state, current, true).await? {
            Rebuild::Current(snapshot) | Rebuild::Installed(snapshot) => Ok(snapshot),
        }
    }

    async fn rebuild_locked(
        &self,
        state: &mut RebuildState,
        current: Option<Arc<CatalogSnapshot>>,
        force: bool,
    ) -> Result<Rebuild, CatalogLoadError> {
        let known = if force {
            None
        } else {
            state
                .failed
                .clone()
                .or_else(|| current.as_ref().map(|snapshot| snapshot.version.clone()))
        };

        let load = self.source.load_if_changed(known.as_ref()).await;
        state.last_checked = Some(Instant::now());

        let (version, bytes) = match load {
            Ok(SourceLoad::Changed { version, bytes }) => (version, bytes),
            Ok(SourceLoad::Unchanged) => {
                return match current {
                    Some(snapshot) => {
                        debug!(version = %snapshot.version, "Catalog source unchanged");
                        Ok(Rebuild::Current(snapshot))
                    }
                    None => Err(CatalogLoadError::unavailable(
                        self.source.describe(),
                        state
                            .last_error
                            .clone()
                            .unwrap_or_else(|| "no catalog has been loaded".to_string()),
                    )),
                };
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                metrics::record_catalog_reload("unavailable");
                return Err(e);
            }
        };

        match parse_catalog(&bytes) {
            Ok(index) => {
                let snapshot = Arc::new(CatalogSnapshot {
                    version,
                    index: Arc::new(index),
                    loaded_at: Utc::now(),
                });
                self.current.store(Some(snapshot.clone()));
                state.failed = None;
                state.last_error = None;

                metrics::record_catalog_reload("success");
                metrics::set_catalog_size(
                    snapshot.index.categories().len(),
                    snapshot.index.service_count(),
                );
                info!(
                    source = %self.source.describe(),
                    version = %snapshot.version,
                    categories = snapshot.index.categories().len(),
                    services = snapshot.index.service_count(),
                    "Catalog loaded"
                );

                Ok(Rebuild::Installed(snapshot))
            }
            Err(e) => {
                state.failed = Some(version);
                state.last_error = Some(e.to_string());
                metrics::record_catalog_reload("invalid");
                Err(e)
            }
        }
    }
}
