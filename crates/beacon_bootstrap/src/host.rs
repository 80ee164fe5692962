//! Hosting page capabilities.

use std::sync::Arc;

use beacon_viewport::{BoundingBox, Viewport, ViewportEvents};

use crate::canvas::CanvasData;

/// An element a canvas renders into.
pub trait CanvasTarget: Send + Sync {
    /// Returns the value of a `data-*` (or any other) attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Returns the element's position relative to the viewport.
    fn bounding_box(&self) -> BoundingBox;

    /// Returns the canvas elements nested inside this one, in document
    /// order. Elements that cannot contain canvases report none.
    fn find_canvases(&self) -> Vec<SharedTarget> {
        Vec::new()
    }
}

/// Shared handle to a [`CanvasTarget`].
pub type SharedTarget = Arc<dyn CanvasTarget>;

/// The hosting page.
pub trait PageHost: Send + Sync {
    /// Returns whether a global such as `Backplane` or `Echo.Utils` exists.
    fn is_defined(&self, global: &str) -> bool;

    /// Returns the current viewport dimensions.
    fn viewport(&self) -> Viewport;

    /// Returns the hub the page publishes scroll and resize events on.
    fn viewport_events(&self) -> &ViewportEvents;

    /// Returns every canvas element on the page, in document order.
    fn find_canvases(&self) -> Vec<SharedTarget>;
}

/// Constructs canvases once their environment is ready.
pub trait CanvasFactory: Send + Sync {
    /// Creates the canvas described by `data`.
    fn create(&self, data: CanvasData);
}
