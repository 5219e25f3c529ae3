//! Catalog sources
//!
//! A source hands out raw catalog bytes together with an opaque version
//! marker. The cache passes back the last marker it saw so a source can
//! answer [`SourceLoad::Unchanged`] without the caller re-normalizing.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, UNIX_EPOCH};
use tracing::{debug, warn};

use super::error::CatalogLoadError;

/// Opaque staleness marker (modification time, content hash, revision)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceVersion(String);

impl SourceVersion {
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of polling a source
#[derive(Debug)]
pub enum SourceLoad {
    /// The marker matches the one the caller already holds
    Unchanged,
    Changed { version: SourceVersion, bytes: Vec<u8> },
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable location, used in logs and errors
    fn describe(&self) -> String;

    /// Return new content when the source's marker differs from `known`.
    ///
    /// `known = None` always yields [`SourceLoad::Changed`] on success.
    /// An unreadable source is [`CatalogLoadError::Unavailable`], never an
    /// empty document.
    async fn load_if_changed(&self, known: Option<&SourceVersion>) -> Result<SourceLoad, CatalogLoadError>;
}

/// Local JSON file, versioned by modification time and size
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn load_if_changed(&self, known: Option<&SourceVersion>) -> Result<SourceLoad, CatalogLoadError> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| CatalogLoadError::unavailable(self.describe(), e))?;

        let modified_nanos = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let version = SourceVersion::new(format!("mtime:{}:len:{}", modified_nanos, metadata.len()));

        if known == Some(&version) {
            return Ok(SourceLoad::Unchanged);
        }

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CatalogLoadError::unavailable(self.describe(), e))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), %version, "Read catalog file");
        Ok(SourceLoad::Changed { version, bytes })
    }
}

/// Remote JSON document, versioned by SHA-256 of its content
pub struct HttpCatalogSource {
    url: String,
    client: reqwest::Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, timeout: Duration, max_retries: u32) -> Result<Self, CatalogLoadError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogLoadError::unavailable(format!("url:{}", url), e))?;

        Ok(Self {
            url,
            client,
            max_retries,
            retry_backoff: Duration::from_millis(250),
        })
    }

    /// Override the initial backoff between retries (doubles per attempt)
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    async fn fetch_once(&self) -> Result<Vec<u8>, String> {
        let response = self.client.get(&self.url).send().await.map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }

    async fn fetch_with_retry(&self) -> Result<Vec<u8>, CatalogLoadError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once().await {
                Ok(bytes) => return Ok(bytes),
                Err(reason) if attempt < self.max_retries => {
                    let delay = self.retry_backoff * 2u32.saturating_pow(attempt);
                    warn!(
                        url = %self.url,
                        attempt = attempt + 1,
                        error = %reason,
                        "Catalog fetch failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(reason) => return Err(CatalogLoadError::unavailable(self.describe(), reason)),
            }
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn describe(&self) -> String {
        format!("url:{}", self.url)
    }

    async fn load_if_changed(&self, known: Option<&SourceVersion>) -> Result<SourceLoad, CatalogLoadError> {
        let bytes = self.fetch_with_retry().await?;
        let version = SourceVersion::new(format!("sha256:{}", content_hash(&bytes)));

        if known == Some(&version) {
            return Ok(SourceLoad::Unchanged);
        }

        debug!(url = %self.url, bytes = bytes.len(), %version, "Downloaded catalog");
        Ok(SourceLoad::Changed { version, bytes })
    }
}

/// Calculate SHA256 hash of content
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Catalog held in memory, versioned by a revision counter.
///
/// Used for embedding a catalog in tests and tools; [`replace`](Self::replace)
/// bumps the revision so caches pick up the new content.
pub struct InMemoryCatalogSource {
    state: Mutex<(u64, Vec<u8>)>,
}

impl InMemoryCatalogSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            state: Mutex::new((1, bytes.into())),
        }
    }

    pub fn replace(&self, bytes: impl Into<Vec<u8>>) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.0 += 1;
        state.1 = bytes.into();
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalogSource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn load_if_changed(&self, known: Option<&SourceVersion>) -> Result<SourceLoad, CatalogLoadError> {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let version = SourceVersion::new(format!("rev:{}", state.0));

        if known == Some(&version) {
            return Ok(SourceLoad::Unchanged);
        }

        Ok(SourceLoad::Changed {
            version,
            bytes: state.1.clone(),
        })
    }
}
