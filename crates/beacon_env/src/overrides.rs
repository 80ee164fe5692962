//! Canvas ids and application config overrides.
//!
//! A canvas id has a mandatory primary part and an optional unique part
//! after `#`, used to tell apart several instances of the same canvas on a
//! page: `jskit/comments-sample#left-side`. Overrides are registered under
//! the full id, so each instance can be tuned independently.

use core::fmt;
use core::str::FromStr;

use hashbrown::HashMap;
use serde_json::Value;

use crate::error::EnvError;

/// Per-application overrides of one canvas, keyed by application id.
pub type AppOverrides = HashMap<String, Value>;

// ─────────────────────────────────────────────────────────────────────────────
// CanvasId
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed canvas id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanvasId {
    primary: String,
    unique: Option<String>,
}

impl CanvasId {
    /// Parses `primary[#unique]`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidCanvasId`] when the primary part is empty.
    pub fn parse(id: &str) -> Result<Self, EnvError> {
        let (primary, unique) = match id.split_once('#') {
            Some((primary, unique)) => (primary, Some(unique)),
            None => (id, None),
        };
        if primary.trim().is_empty() {
            return Err(EnvError::InvalidCanvasId(id.to_owned()));
        }

        Ok(Self {
            primary: primary.to_owned(),
            unique: unique.filter(|u| !u.is_empty()).map(str::to_owned),
        })
    }

    /// Returns the primary identifier.
    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Returns the per-page unique identifier, if any.
    #[must_use]
    pub fn unique(&self) -> Option<&str> {
        self.unique.as_deref()
    }
}

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unique {
            Some(unique) => write!(f, "{}#{unique}", self.primary),
            None => f.write_str(&self.primary),
        }
    }
}

impl FromStr for CanvasId {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OverrideRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Application config overrides keyed by full canvas id, then application id.
#[derive(Debug, Clone, Default)]
pub struct OverrideRegistry {
    canvases: HashMap<String, AppOverrides>,
}

impl OverrideRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `patch` for `app_id` inside `canvas_id`, replacing any
    /// earlier override of the same pair.
    pub fn set_override(&mut self, canvas_id: impl Into<String>, app_id: impl Into<String>, patch: Value) {
        let canvas_id = canvas_id.into();
        let app_id = app_id.into();
        tracing::debug!(%canvas_id, %app_id, "override registered");
        self.canvases
            .entry(canvas_id)
            .or_default()
            .insert(app_id, patch);
    }

    /// Returns every override for the canvas, empty when none is registered.
    #[must_use]
    pub fn overrides_for(&self, canvas_id: &str) -> AppOverrides {
        self.canvases.get(canvas_id).cloned().unwrap_or_default()
    }

    /// Returns the override of one application, if any.
    #[must_use]
    pub fn app_override(&self, canvas_id: &str, app_id: &str) -> Option<&Value> {
        self.canvases.get(canvas_id)?.get(app_id)
    }

    /// Returns the number of canvases with overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.canvases.len()
    }

    /// Returns whether no override is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }
}

/// Deep-merges `patch` into `target`.
///
/// Objects merge key by key; any other patch value replaces the target
/// value, `null` included.
///
/// ```
/// use beacon_env::merge_patch;
/// use serde_json::json;
///
/// let mut config = json!({"liveUpdates": {"enabled": true, "timeout": 10}, "appkey": "a"});
/// merge_patch(&mut config, &json!({"liveUpdates": {"timeout": 5}}));
/// assert_eq!(config, json!({"liveUpdates": {"enabled": true, "timeout": 5}, "appkey": "a"}));
/// ```
pub fn merge_patch(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => merge_patch(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}
