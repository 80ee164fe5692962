//! Viewport geometry and visibility gating for Beacon (Layer 1).
//!
//! Canvases marked `when-visible` defer their initialization until their
//! target scrolls into view.
//!
//! - [`geometry`] - Bounding boxes, viewport height, the in-viewport predicate
//! - [`events`] - Scroll/resize notifications fanned out to subscribers
//! - [`gate`] - [`VisibilityGate::init_when_visible`], the debounced gate
//!
//! # Example
//!
//! ```
//! use beacon_viewport::{BoundingBox, Viewport, is_in_viewport};
//!
//! let viewport = Viewport::new(800.0, 2400.0);
//! assert!(is_in_viewport(BoundingBox::new(120.0), viewport));
//! assert!(!is_in_viewport(BoundingBox::new(1200.0), viewport));
//! ```

pub mod error;
pub mod events;
pub mod gate;
pub mod geometry;

pub use error::GateError;
pub use events::{ViewportEvent, ViewportEvents, ViewportSubscription};
pub use gate::{VisibilityGate, VisibilityWatch};
pub use geometry::{BoundingBox, Viewport, is_in_viewport};
