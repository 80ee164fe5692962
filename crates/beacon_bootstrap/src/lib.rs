//! Environment, application and canvas bootstrap for Beacon (Layer 2).
//!
//! A page embeds canvases, regions that host one or more applications.
//! Before any canvas can be constructed the base runtime (Backplane, the
//! bundled jQuery, the environment pack) has to be present. [`Bootstrap`]
//! drives that sequence through a shared [`Loader`](beacon_loader::Loader):
//!
//! - [`host`] - What the hosting page provides: globals, viewport, canvases
//! - [`manifest`] - The base runtime resources and the globals they define
//! - [`app`] - Application descriptions and script selection
//! - [`canvas`] - Data handed to the canvas constructor
//! - [`bootstrap`] - [`Bootstrap`] itself
//!
//! Rendering and canvas configuration fetching belong to the canvas
//! implementation behind [`CanvasFactory`].

pub mod app;
pub mod bootstrap;
pub mod canvas;
pub mod error;
pub mod host;
pub mod manifest;

pub use app::{AppScripts, AppSpec, InitMode, ScriptLocation};
pub use bootstrap::{Bootstrap, BootstrapBuilder};
pub use canvas::{CanvasData, attributes};
pub use error::BootstrapError;
pub use host::{CanvasFactory, CanvasTarget, PageHost, SharedTarget};
pub use manifest::{EnvironmentManifest, ManifestEntry};
