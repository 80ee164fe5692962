//! # Beacon Internal Library
//!
//! Re-exports the Beacon crates for convenience.

/// Tracing setup shared by every layer.
pub use beacon_core;

/// Layer 1: resource loading, deduplication and serialized downloads.
pub use beacon_loader;

/// Layer 1: page environment (debug directives, cookies, overrides).
pub use beacon_env;

/// Layer 1: viewport visibility gating.
pub use beacon_viewport;

/// Layer 2: canvas discovery and application bootstrapping.
pub use beacon_bootstrap;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use beacon_bootstrap::{AppSpec, Bootstrap, CanvasData, CanvasFactory, CanvasTarget, PageHost};
    pub use beacon_core::TracingSetup;
    pub use beacon_env::{Environment, MemoryCookieJar, PageLocation};
    pub use beacon_loader::prelude::*;
    pub use beacon_viewport::{VisibilityGate, VisibilityWatch};
}
