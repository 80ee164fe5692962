//! Simulated page for the Beacon loader demo.
//!
//! Stands in for a browser: [`SimulatedExecutor`] "injects" resources by
//! sleeping and defining the globals they would define, [`SimulatedPage`]
//! hosts canvases and viewport events, and [`LoggingFactory`] logs each
//! canvas it is asked to construct.
//!
//! ```text
//! ┌──────────────┐  download   ┌────────┐  batch   ┌───────────────────┐
//! │  Bootstrap   │────────────▶│ Loader │─────────▶│ SimulatedExecutor │
//! └──────┬───────┘             └────────┘          └─────────┬─────────┘
//!        │ create                                            │ define global
//!        ▼                                                   ▼
//! ┌──────────────┐                                   ┌───────────────┐
//! │LoggingFactory│                                   │ SimulatedPage │
//! └──────────────┘                                   └───────────────┘
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use beacon_bootstrap::{CanvasData, CanvasFactory, CanvasTarget, PageHost, SharedTarget};
use beacon_loader::{BatchError, BatchExecutor, DownloadBatch};
use beacon_viewport::{BoundingBox, Viewport, ViewportEvent, ViewportEvents};
use parking_lot::Mutex;

// ─────────────────────────────────────────────────────────────────────────────
// SimulatedPage
// ─────────────────────────────────────────────────────────────────────────────

/// A canvas element at a fixed attribute set and movable position.
#[derive(Debug)]
pub struct SimulatedCanvas {
    attributes: HashMap<String, String>,
    top: Mutex<f64>,
}

impl SimulatedCanvas {
    /// Creates a canvas element.
    #[must_use]
    pub fn new(attributes: &[(&str, &str)], top: f64) -> Arc<Self> {
        Arc::new(Self {
            attributes: attributes
                .iter()
                .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
                .collect(),
            top: Mutex::new(top),
        })
    }

    /// Moves the element relative to the viewport top.
    pub fn scroll_by(&self, delta: f64) {
        *self.top.lock() -= delta;
    }
}

impl CanvasTarget for SimulatedCanvas {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(*self.top.lock())
    }
}

/// Page globals, canvases and viewport.
#[derive(Debug)]
pub struct SimulatedPage {
    globals: Mutex<HashSet<String>>,
    canvases: Vec<Arc<SimulatedCanvas>>,
    viewport: Viewport,
    events: ViewportEvents,
}

impl SimulatedPage {
    /// Creates a page with the given canvases and viewport.
    #[must_use]
    pub fn new(canvases: Vec<Arc<SimulatedCanvas>>, viewport: Viewport) -> Arc<Self> {
        Arc::new(Self {
            globals: Mutex::new(HashSet::new()),
            canvases,
            viewport,
            events: ViewportEvents::new(),
        })
    }

    /// Defines a global, as a loaded script would.
    pub fn define(&self, global: &str) {
        self.globals.lock().insert(global.to_owned());
    }

    /// Scrolls every canvas by `delta` pixels and fires a scroll event.
    pub fn scroll(&self, delta: f64) {
        for canvas in &self.canvases {
            canvas.scroll_by(delta);
        }
        self.events.notify(ViewportEvent::Scroll);
    }
}

impl PageHost for SimulatedPage {
    fn is_defined(&self, global: &str) -> bool {
        self.globals.lock().contains(global)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn viewport_events(&self) -> &ViewportEvents {
        &self.events
    }

    fn find_canvases(&self) -> Vec<SharedTarget> {
        self.canvases
            .iter()
            .map(|canvas| Arc::clone(canvas) as SharedTarget)
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SimulatedExecutor
// ─────────────────────────────────────────────────────────────────────────────

/// Batch executor that pretends to inject resources.
#[derive(Debug)]
pub struct SimulatedExecutor {
    page: Arc<SimulatedPage>,
    latency: Duration,
    globals: HashMap<String, String>,
}

impl SimulatedExecutor {
    /// Creates an executor taking `latency` per batch.
    #[must_use]
    pub fn new(page: Arc<SimulatedPage>, latency: Duration) -> Self {
        Self {
            page,
            latency,
            globals: HashMap::new(),
        }
    }

    /// Defines `global` on the page whenever a URL ending in `suffix` loads.
    #[must_use]
    pub fn defines(mut self, suffix: impl Into<String>, global: impl Into<String>) -> Self {
        self.globals.insert(suffix.into(), global.into());
        self
    }
}

#[async_trait]
impl BatchExecutor for SimulatedExecutor {
    async fn execute(&self, batch: &DownloadBatch) -> Result<(), BatchError> {
        for directive in batch.directives() {
            tracing::info!(%directive, "injecting");
        }
        tokio::time::sleep(self.latency).await;

        for url in batch.urls() {
            if let Some(global) = self
                .globals
                .iter()
                .find_map(|(suffix, global)| url.as_str().ends_with(suffix.as_str()).then_some(global))
            {
                self.page.define(global);
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LoggingFactory
// ─────────────────────────────────────────────────────────────────────────────

/// Canvas factory that logs and counts constructions.
#[derive(Debug, Default)]
pub struct LoggingFactory {
    created: Mutex<Vec<Option<String>>>,
}

impl LoggingFactory {
    /// Creates a factory.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns the ids of the canvases created so far.
    #[must_use]
    pub fn created(&self) -> Vec<Option<String>> {
        self.created.lock().clone()
    }
}

impl CanvasFactory for LoggingFactory {
    fn create(&self, data: CanvasData) {
        tracing::info!(
            id = data.id.as_deref().unwrap_or("<none>"),
            apps = data.apps.len(),
            overrides = data.overrides.len(),
            "canvas created"
        );
        self.created.lock().push(data.id);
    }
}
