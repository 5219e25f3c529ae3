//! Service catalog resolution
//!
//! Turns an untrusted, heterogeneously shaped catalog document into a
//! canonical [`CatalogIndex`] and keeps the current index cached behind an
//! atomic swap so readers never see a partially rebuilt catalog.

pub mod aliases;
pub mod cache;
pub mod error;
pub mod model;
pub mod normalize;
pub mod refresher;
pub mod source;

pub use cache::{CatalogCache, CatalogSnapshot};
pub use error::{CatalogLoadError, LookupError};
pub use model::{CatalogIndex, Category, ResolvedService, ServiceEntry};
pub use normalize::{normalize, parse_catalog};
pub use refresher::CatalogRefresher;
pub use source::{
    CatalogSource, FileCatalogSource, HttpCatalogSource, InMemoryCatalogSource, SourceLoad,
    SourceVersion,
};
