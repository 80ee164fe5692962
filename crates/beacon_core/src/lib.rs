//! Ambient infrastructure shared by Beacon crates.
//!
//! - [`tracing_setup`] - Installs the process-wide `tracing` subscriber
//!
//! Library crates only emit events through the `tracing` macros; binaries
//! call [`TracingSetup::init`] once at startup to decide where they go.

pub mod tracing_setup;

pub use tracing_setup::{TracingConfig, TracingFormat, TracingSetup};
