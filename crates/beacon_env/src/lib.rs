//! Page environment inputs for Beacon (Layer 1).
//!
//! The loader itself is environment-agnostic. This crate reads the things a
//! hosting page provides and turns them into loader settings:
//!
//! - [`page`] - Page location: protocol and URL hash
//! - [`cookie`] - Cookie jar abstraction and an in-memory jar
//! - [`debug`] - Debug mode from the URL hash or a persisted cookie
//! - [`environment`] - [`Environment`] wiring all of the above into a loader
//! - [`overrides`] - Canvas ids and per-application config overrides
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use beacon_env::{Environment, MemoryCookieJar, PageLocation};
//! use beacon_loader::LoaderConfig;
//!
//! let page = PageLocation::parse("https://example.com/news#echo-debug:true");
//! let env = Environment::new(page, Arc::new(MemoryCookieJar::new()));
//!
//! assert!(env.debug(&LoaderConfig::default()));
//! ```

pub mod cookie;
pub mod debug;
pub mod environment;
pub mod error;
pub mod overrides;
pub mod page;

pub use cookie::{CookieJar, CookieOptions, MemoryCookieJar};
pub use debug::{DebugSource, parse_debug_directive, resolve_debug};
pub use environment::Environment;
pub use error::EnvError;
pub use overrides::{AppOverrides, CanvasId, OverrideRegistry, merge_patch};
pub use page::PageLocation;
