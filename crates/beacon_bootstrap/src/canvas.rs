//! Canvas construction data.

use core::fmt;

use beacon_env::{AppOverrides, merge_patch};
use serde_json::Value;

use crate::app::AppSpec;
use crate::host::SharedTarget;

/// Attribute names read from canvas elements.
pub mod attributes {
    /// Full canvas id, `primary[#unique]`.
    pub const CANVAS_ID: &str = "data-canvas-id";
    /// Initialization mode, `immediate` or `when-visible`.
    pub const INIT: &str = "data-canvas-init";
    /// `"true"` to re-create the canvas on user invalidation.
    pub const REFRESH_ON_USER_INVALIDATE: &str = "data-canvas-refreshOnUserInvalidate";
}

/// Everything a [`CanvasFactory`](crate::CanvasFactory) needs to construct
/// a canvas.
#[derive(Clone)]
pub struct CanvasData {
    /// Element the canvas renders into.
    pub target: SharedTarget,
    /// Full canvas id, when the element carries one.
    pub id: Option<String>,
    /// Re-create the canvas when the user session is invalidated.
    pub refresh_on_user_invalidate: bool,
    /// Route API calls through the secure endpoint.
    pub use_secure_api: bool,
    /// Config overrides registered for this canvas, keyed by app id.
    pub overrides: AppOverrides,
    /// Applications known up front. Empty for page canvases, whose
    /// configuration the canvas fetches itself.
    pub apps: Vec<AppSpec>,
    /// Backplane initialization data.
    pub backplane: Option<Value>,
}

impl fmt::Debug for CanvasData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasData")
            .field("id", &self.id)
            .field("refresh_on_user_invalidate", &self.refresh_on_user_invalidate)
            .field("use_secure_api", &self.use_secure_api)
            .field("overrides", &self.overrides)
            .field("apps", &self.apps)
            .field("backplane", &self.backplane)
            .finish_non_exhaustive()
    }
}

impl CanvasData {
    /// Creates data for `target` with nothing else known.
    #[must_use]
    pub fn new(target: SharedTarget) -> Self {
        Self {
            target,
            id: None,
            refresh_on_user_invalidate: false,
            use_secure_api: false,
            overrides: AppOverrides::new(),
            apps: Vec::new(),
            backplane: None,
        }
    }

    /// Returns `app`'s constructor parameters with this canvas's override
    /// for it merged in.
    #[must_use]
    pub fn app_config(&self, app: &AppSpec) -> Value {
        let mut config = app.config.clone();
        if let Some(patch) = app.id.as_deref().and_then(|id| self.overrides.get(id)) {
            merge_patch(&mut config, patch);
        }
        config
    }
}
