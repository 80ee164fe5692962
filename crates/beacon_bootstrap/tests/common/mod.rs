//! Shared fakes for `beacon_bootstrap` integration tests.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use beacon_bootstrap::{Bootstrap, CanvasData, CanvasFactory, CanvasTarget, PageHost, SharedTarget};
use beacon_loader::testing::RecordingExecutor;
use beacon_loader::{Loader, LoaderConfig, Scheme};
use beacon_viewport::{BoundingBox, Viewport, ViewportEvent, ViewportEvents};
use parking_lot::Mutex;

pub const BASE_RUNTIME: [(&str, &str); 3] = [
    ("backplane.js", "Backplane"),
    ("third-party/jquery.pack.js", "Echo.jQuery"),
    ("environment.pack.js", "Echo.Utils"),
];

// ─────────────────────────────────────────────────────────────────────────────
// Page fakes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeElement {
    attributes: HashMap<String, String>,
    top: Mutex<f64>,
    children: Mutex<Vec<SharedTarget>>,
}

impl FakeElement {
    pub fn new(attributes: &[(&str, &str)], top: f64) -> Arc<Self> {
        Arc::new(Self {
            attributes: attributes
                .iter()
                .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
                .collect(),
            top: Mutex::new(top),
            children: Mutex::new(Vec::new()),
        })
    }

    pub fn add_child(&self, child: SharedTarget) {
        self.children.lock().push(child);
    }

    pub fn scroll_to(&self, top: f64) {
        *self.top.lock() = top;
    }
}

impl CanvasTarget for FakeElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(*self.top.lock())
    }

    fn find_canvases(&self) -> Vec<SharedTarget> {
        self.children.lock().clone()
    }
}

#[derive(Default)]
pub struct FakeHost {
    globals: Mutex<HashSet<String>>,
    events: ViewportEvents,
    canvases: Mutex<Vec<SharedTarget>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn define(&self, global: &str) {
        self.globals.lock().insert(global.to_owned());
    }

    pub fn define_base_runtime(&self) {
        for (_, global) in BASE_RUNTIME {
            self.define(global);
        }
    }

    pub fn notify(&self, event: ViewportEvent) {
        self.events.notify(event);
    }

    pub fn add_canvas(&self, canvas: SharedTarget) {
        self.canvases.lock().push(canvas);
    }
}

impl PageHost for FakeHost {
    fn is_defined(&self, global: &str) -> bool {
        self.globals.lock().contains(global)
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(600.0, 0.0)
    }

    fn viewport_events(&self) -> &ViewportEvents {
        &self.events
    }

    fn find_canvases(&self) -> Vec<SharedTarget> {
        self.canvases.lock().clone()
    }
}

#[derive(Default)]
pub struct RecordingFactory {
    created: Mutex<Vec<CanvasData>>,
}

impl RecordingFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> Vec<CanvasData> {
        self.created.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.created.lock().len()
    }
}

impl CanvasFactory for RecordingFactory {
    fn create(&self, data: CanvasData) {
        self.created.lock().push(data);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────────────────────────────────────

pub struct Page {
    pub host: Arc<FakeHost>,
    pub factory: Arc<RecordingFactory>,
    pub executor: RecordingExecutor,
    pub bootstrap: Bootstrap,
}

/// A page whose executor defines each base runtime global when it loads.
pub fn page(scheme: Scheme, debug: bool) -> Page {
    let host = FakeHost::new();
    let factory = RecordingFactory::new();

    let mut executor = RecordingExecutor::new();
    for (url, global) in BASE_RUNTIME {
        let host = Arc::clone(&host);
        executor = executor.on_load(url, move || host.define(global));
    }

    let loader = Loader::builder(executor.clone())
        .with_config(
            LoaderConfig::new()
                .with_cdn_base_url("//cdn.example.com/")
                .with_version("3"),
        )
        .with_scheme(scheme)
        .with_debug(debug)
        .build()
        .expect("loader builds inside a runtime");

    let bootstrap = Bootstrap::builder(loader, host.clone(), factory.clone()).build();

    Page {
        host,
        factory,
        executor,
        bootstrap,
    }
}
