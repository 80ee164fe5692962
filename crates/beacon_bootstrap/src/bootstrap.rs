//! The [`Bootstrap`] driver.
//!
//! # Canvas initialization
//!
//! ```text
//! init / init_within / init_application
//!     |
//!     v
//! mode == immediate, or target in viewport?
//!     | yes                           | no
//!     v                               v
//! init_environment            VisibilityGate (debounced)
//!     |                               |
//!     |<------- target visible -------+
//!     v
//! CanvasFactory::create
//! ```
//!
//! `init_environment` only touches the loader when some base runtime global
//! is missing; otherwise the callback runs synchronously.

use core::fmt;
use std::sync::Arc;

use beacon_env::{CanvasId, OverrideRegistry};
use beacon_loader::{Download, Loader};
use beacon_viewport::{VisibilityGate, VisibilityWatch, is_in_viewport};
use parking_lot::Mutex;
use serde_json::Value;

use crate::app::{AppSpec, InitMode};
use crate::canvas::{CanvasData, attributes};
use crate::error::BootstrapError;
use crate::host::{CanvasFactory, CanvasTarget, PageHost, SharedTarget};
use crate::manifest::EnvironmentManifest;

// ─────────────────────────────────────────────────────────────────────────────
// BootstrapBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for [`Bootstrap`].
pub struct BootstrapBuilder {
    loader: Loader,
    host: Arc<dyn PageHost>,
    factory: Arc<dyn CanvasFactory>,
    manifest: EnvironmentManifest,
    gate: Option<VisibilityGate>,
    overrides: OverrideRegistry,
}

impl fmt::Debug for BootstrapBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapBuilder")
            .field("loader", &self.loader)
            .field("manifest", &self.manifest)
            .field("gate", &self.gate)
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

impl BootstrapBuilder {
    /// Replaces the base runtime manifest.
    #[must_use]
    pub fn with_manifest(mut self, manifest: EnvironmentManifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Replaces the visibility gate.
    ///
    /// Defaults to a gate on the loader's runtime debounced by the loader's
    /// viewport change timeout.
    #[must_use]
    pub fn with_gate(mut self, gate: VisibilityGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Starts from overrides registered elsewhere.
    #[must_use]
    pub fn with_overrides(mut self, overrides: OverrideRegistry) -> Self {
        self.overrides = overrides;
        self
    }

    /// Builds the bootstrap driver.
    #[must_use]
    pub fn build(self) -> Bootstrap {
        let gate = self.gate.unwrap_or_else(|| {
            VisibilityGate::new(
                self.loader.config().viewport_change_timeout(),
                self.loader.runtime().clone(),
            )
        });

        Bootstrap {
            inner: Arc::new(BootstrapInner {
                loader: self.loader,
                host: self.host,
                factory: self.factory,
                manifest: self.manifest,
                gate,
                overrides: Mutex::new(self.overrides),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bootstrap
// ─────────────────────────────────────────────────────────────────────────────

struct BootstrapInner {
    loader: Loader,
    host: Arc<dyn PageHost>,
    factory: Arc<dyn CanvasFactory>,
    manifest: EnvironmentManifest,
    gate: VisibilityGate,
    overrides: Mutex<OverrideRegistry>,
}

/// Establishes the base runtime and initializes canvases on a page.
///
/// Cloning is cheap and shares the override registry.
#[derive(Clone)]
pub struct Bootstrap {
    inner: Arc<BootstrapInner>,
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrap")
            .field("loader", &self.inner.loader)
            .field("manifest", &self.inner.manifest)
            .field("gate", &self.inner.gate)
            .finish_non_exhaustive()
    }
}

impl Bootstrap {
    /// Starts building a bootstrap driver.
    pub fn builder(loader: Loader, host: Arc<dyn PageHost>, factory: Arc<dyn CanvasFactory>) -> BootstrapBuilder {
        BootstrapBuilder {
            loader,
            host,
            factory,
            manifest: EnvironmentManifest::default(),
            gate: None,
            overrides: OverrideRegistry::new(),
        }
    }

    /// Returns the loader.
    #[must_use]
    pub fn loader(&self) -> &Loader {
        &self.inner.loader
    }

    /// Returns whether every base runtime global is defined.
    #[must_use]
    pub fn is_environment_ready(&self) -> bool {
        let descriptors = self.inner.manifest.descriptors(&self.inner.host);
        self.inner.loader.is_ready(&descriptors)
    }

    /// Runs `callback` once the base runtime is present.
    ///
    /// When it already is, the callback runs before this returns and the
    /// loader is not consulted beyond a readiness query.
    pub fn init_environment<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let descriptors = self.inner.manifest.descriptors(&self.inner.host);
        if self.inner.loader.is_ready(&descriptors) {
            callback();
            return;
        }
        self.inner.loader.download(descriptors, callback);
    }

    /// Like [`init_environment`](Self::init_environment), as a future.
    pub fn load_environment(&self) -> Download {
        let descriptors = self.inner.manifest.descriptors(&self.inner.host);
        self.inner.loader.load(descriptors)
    }

    /// Registers a config override for `app_id` inside `canvas_id`.
    ///
    /// Applies to canvases initialized afterwards.
    pub fn set_override(&self, canvas_id: impl Into<String>, app_id: impl Into<String>, patch: Value) {
        self.inner
            .overrides
            .lock()
            .set_override(canvas_id, app_id, patch);
    }

    /// Initializes canvases, or every canvas on the page when `canvases` is
    /// `None`.
    ///
    /// Returns one watch per canvas, in order. Canvases whose id is missing
    /// or malformed are still handed to the factory, which reports them.
    pub fn init(&self, canvases: Option<Vec<SharedTarget>>) -> Vec<VisibilityWatch> {
        let canvases = canvases.unwrap_or_else(|| self.inner.host.find_canvases());
        tracing::debug!(canvases = canvases.len(), "initializing canvases");

        canvases
            .into_iter()
            .map(|target| {
                let id = target.attribute(attributes::CANVAS_ID);
                match id.as_deref().map(CanvasId::parse) {
                    Some(Ok(_)) => {}
                    Some(Err(err)) => tracing::warn!(error = %err, "invalid canvas id"),
                    None => tracing::warn!("canvas without an id"),
                }

                let mode = InitMode::from_attribute(target.attribute(attributes::INIT).as_deref());
                let mut data = CanvasData::new(Arc::clone(&target));
                data.refresh_on_user_invalidate = target
                    .attribute(attributes::REFRESH_ON_USER_INVALIDATE)
                    .is_some_and(|value| value == "true");
                data.overrides = id
                    .as_deref()
                    .map(|id| self.inner.overrides.lock().overrides_for(id))
                    .unwrap_or_default();
                data.id = id;

                self.init_canvas(data, mode)
            })
            .collect()
    }

    /// Initializes the canvases nested inside `container`.
    pub fn init_within(&self, container: &dyn CanvasTarget) -> Vec<VisibilityWatch> {
        self.init(Some(container.find_canvases()))
    }

    /// Initializes a canvas hosting the single application `app` in `target`.
    ///
    /// The application's script is selected for the current debug mode and
    /// page security before the canvas sees it.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::MissingComponent`] when `app` names no
    /// component.
    pub fn init_application(&self, mut app: AppSpec, target: SharedTarget) -> Result<VisibilityWatch, BootstrapError> {
        app.validate()?;

        let loader = &self.inner.loader;
        app.script = app.script_url(loader.is_debug(), loader.scheme().is_secure());
        app.scripts = None;

        let mode = app.init;
        let mut data = CanvasData::new(target);
        data.use_secure_api = app.use_secure_api();
        data.refresh_on_user_invalidate = app.refresh_on_user_invalidate;
        data.backplane = app.backplane.clone();
        data.apps = vec![app];

        Ok(self.init_canvas(data, mode))
    }

    fn init_canvas(&self, data: CanvasData, mode: InitMode) -> VisibilityWatch {
        let target = Arc::clone(&data.target);
        let this = self.clone();
        let start = move || {
            let factory = Arc::clone(&this.inner.factory);
            this.init_environment(move || factory.create(data));
        };

        match mode {
            InitMode::Immediate => {
                start();
                VisibilityWatch::Immediate
            }
            InitMode::WhenVisible => {
                let host = Arc::clone(&self.inner.host);
                self.inner.gate.init_when_visible(
                    target,
                    self.inner.host.viewport_events(),
                    move |target: &SharedTarget| is_in_viewport(target.bounding_box(), host.viewport()),
                    start,
                )
            }
        }
    }
}
