//! Viewport geometry.

use serde::{Deserialize, Serialize};

/// Position of a target relative to the top of the viewport, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Distance from the viewport top. Negative once scrolled past.
    pub top: f64,
}

impl BoundingBox {
    /// Creates a box at `top`.
    #[must_use]
    pub const fn new(top: f64) -> Self {
        Self { top }
    }
}

/// Client heights reported by the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Client height of the document element.
    pub document_client_height: f64,
    /// Client height of the body element.
    pub body_client_height: f64,
}

impl Viewport {
    /// Creates a viewport from document and body client heights.
    #[must_use]
    pub const fn new(document_client_height: f64, body_client_height: f64) -> Self {
        Self {
            document_client_height,
            body_client_height,
        }
    }

    /// Visible height: the document height, or the body height when the
    /// document reports zero.
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.document_client_height == 0.0 {
            self.body_client_height
        } else {
            self.document_client_height
        }
    }
}

/// Returns whether a target's top edge is within the viewport height.
#[must_use]
pub fn is_in_viewport(target: BoundingBox, viewport: Viewport) -> bool {
    target.top <= viewport.height()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_falls_back_to_body() {
        assert_eq!(Viewport::new(0.0, 640.0).height(), 640.0);
        assert_eq!(Viewport::new(700.0, 640.0).height(), 700.0);
    }

    #[test]
    fn edge_is_inclusive() {
        let viewport = Viewport::new(500.0, 0.0);
        assert!(is_in_viewport(BoundingBox::new(500.0), viewport));
        assert!(!is_in_viewport(BoundingBox::new(500.5), viewport));
        assert!(is_in_viewport(BoundingBox::new(-300.0), viewport));
    }

    #[test]
    fn deserializes_host_snapshot() {
        let viewport: Viewport =
            serde_json::from_str(r#"{"document_client_height":0,"body_client_height":900}"#).unwrap();
        assert_eq!(viewport.height(), 900.0);
    }
}
