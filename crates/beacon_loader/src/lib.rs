//! Resource loading and deduplication engine for Beacon (Layer 1).
//!
//! `beacon_loader` turns logical resource references into canonical URLs,
//! downloads every physical resource at most once no matter how many
//! overlapping requests ask for it, and releases callers exactly when their
//! resource sets become ready.
//!
//! - [`url`] - Canonical URL resolution
//! - [`descriptor`] - Resource descriptors and custom readiness checks
//! - [`state`] - The ready-state table used for deduplication
//! - [`queue`] - Pending requests and the dispatch pass
//! - [`scheduler`] - Strictly sequential download batches
//! - [`loader`] - The [`Loader`] facade tying it all together
//!
//! # Example
//!
//! ```no_run
//! use beacon_loader::prelude::*;
//!
//! struct NoopExecutor;
//!
//! #[async_trait::async_trait]
//! impl BatchExecutor for NoopExecutor {
//!     async fn execute(&self, _batch: &DownloadBatch) -> Result<(), BatchError> {
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() -> Result<(), LoaderError> {
//! let loader = Loader::builder(NoopExecutor).build()?;
//!
//! loader
//!     .load([ResourceDescriptor::new("streamserver.pack.js")])
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`beacon_loader`, `beacon_env`, `beacon_viewport`): engine and environment inputs
//! - **Layer 2** (`beacon_bootstrap`): canvas and application bootstrap consuming the loader

pub mod config;
pub mod debug;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod queue;
pub mod scheduler;
pub mod state;
pub mod url;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::LoaderConfig;
pub use debug::DebugFlag;
pub use descriptor::{LoadedCheck, ResolvedResource, ResourceDescriptor, ResourceKind};
pub use error::{ConfigError, LoaderError};
pub use loader::{Callback, Download, DownloadOptions, Loader, LoaderBuilder, LoaderState};
pub use scheduler::{BatchError, BatchExecutor, DownloadBatch, DownloadScheduler};
pub use state::{ReadyStateTable, ResourceState};
pub use url::{CanonicalUrl, Scheme, UrlResolver};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::config::LoaderConfig;
    pub use crate::descriptor::ResourceDescriptor;
    pub use crate::error::LoaderError;
    pub use crate::loader::{Download, DownloadOptions, Loader};
    pub use crate::scheduler::{BatchError, BatchExecutor, DownloadBatch};
    pub use crate::url::{CanonicalUrl, Scheme};
}
