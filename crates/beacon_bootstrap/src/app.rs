//! Application descriptions.
//!
//! An application names the component class to construct and where its
//! script lives. Script selection:
//!
//! | `scripts` | Debug | Picked |
//! |-----------|-------|--------|
//! | absent | any | `script` |
//! | present | on | `dev`, else `prod` |
//! | present | off | `prod`, else `dev` |
//!
//! A picked location is either a plain URL or a `{regular, secure}` pair
//! chosen by page security, each side falling back to the other.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BootstrapError;

// ─────────────────────────────────────────────────────────────────────────────
// InitMode
// ─────────────────────────────────────────────────────────────────────────────

/// When a canvas initializes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitMode {
    /// As soon as the environment is ready.
    #[default]
    Immediate,
    /// Once the canvas target scrolls into view.
    WhenVisible,
}

impl InitMode {
    /// Reads a `data-canvas-init` attribute. Anything other than
    /// `when-visible` means [`InitMode::Immediate`].
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("when-visible") => Self::WhenVisible,
            _ => Self::Immediate,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScriptLocation
// ─────────────────────────────────────────────────────────────────────────────

/// Where one build of an application script lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptLocation {
    /// Same URL on every page.
    Url(String),
    /// Separate URLs for plain and secure pages.
    Split {
        /// URL for `http:` pages.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regular: Option<String>,
        /// URL for `https:` pages.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        secure: Option<String>,
    },
}

impl ScriptLocation {
    /// Picks the URL for a page of the given security.
    #[must_use]
    pub fn resolve(&self, secure: bool) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url.as_str()),
            Self::Split { regular, secure: ssl } => {
                let (preferred, fallback) = if secure { (ssl, regular) } else { (regular, ssl) };
                preferred.as_deref().or(fallback.as_deref())
            }
        }
    }
}

/// Production and development builds of an application script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppScripts {
    /// Minified build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prod: Option<ScriptLocation>,
    /// Non-minified build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev: Option<ScriptLocation>,
}

// ─────────────────────────────────────────────────────────────────────────────
// AppSpec
// ─────────────────────────────────────────────────────────────────────────────

/// One application hosted by a canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSpec {
    /// Application id within its canvas; overrides are keyed by it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name of the component class to construct.
    #[serde(default)]
    pub component: String,
    /// Single script URL, used when `scripts` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Per-build script locations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<AppScripts>,
    /// Data passed to the Backplane initialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backplane: Option<Value>,
    /// Parameters passed to the component constructor.
    #[serde(default)]
    pub config: Value,
    /// Initialization mode.
    #[serde(default)]
    pub init: InitMode,
    /// Re-create the canvas when the user session is invalidated.
    #[serde(default)]
    pub refresh_on_user_invalidate: bool,
}

impl AppSpec {
    /// Creates an application for `component`.
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            ..Self::default()
        }
    }

    /// Parses and validates a JSON description.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Parse`] for malformed JSON and
    /// [`BootstrapError::MissingComponent`] when no component is named.
    pub fn from_json(json: &str) -> Result<Self, BootstrapError> {
        let app: Self = serde_json::from_str(json)?;
        app.validate()?;
        Ok(app)
    }

    /// Checks that the description can be constructed.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::MissingComponent`] when `component` is blank.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        if self.component.trim().is_empty() {
            return Err(BootstrapError::MissingComponent);
        }
        Ok(())
    }

    /// Sets the single script URL.
    #[must_use]
    pub fn with_script(mut self, url: impl Into<String>) -> Self {
        self.script = Some(url.into());
        self
    }

    /// Sets per-build script locations.
    #[must_use]
    pub fn with_scripts(mut self, scripts: AppScripts) -> Self {
        self.scripts = Some(scripts);
        self
    }

    /// Sets the initialization mode.
    #[must_use]
    pub fn with_init(mut self, init: InitMode) -> Self {
        self.init = init;
        self
    }

    /// Sets the constructor parameters.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Picks the script URL for the current debug mode and page security.
    #[must_use]
    pub fn script_url(&self, debug: bool, secure: bool) -> Option<String> {
        let Some(scripts) = &self.scripts else {
            return self.script.clone();
        };
        let (preferred, fallback) = if debug {
            (&scripts.dev, &scripts.prod)
        } else {
            (&scripts.prod, &scripts.dev)
        };
        preferred
            .as_ref()
            .or(fallback.as_ref())
            .and_then(|location| location.resolve(secure))
            .map(str::to_owned)
    }

    /// Reads the boolean `useSecureAPI` constructor parameter.
    #[must_use]
    pub fn use_secure_api(&self) -> bool {
        self.config
            .get("useSecureAPI")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
