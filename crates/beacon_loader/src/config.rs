//! Loader configuration.
//!
//! [`LoaderConfig`] carries every tunable the engine and its collaborators
//! read: the CDN base URL template, the SDK version segment, the download
//! error timeout, the viewport debounce, and the names used to source the
//! debug flag.
//!
//! Every field has a default, so a JSON document only needs to mention the
//! values it overrides:
//!
//! ```
//! use beacon_loader::LoaderConfig;
//! use core::time::Duration;
//!
//! let config = LoaderConfig::from_json(r#"{ "error_timeout_ms": 2500 }"#).unwrap();
//! assert_eq!(config.error_timeout(), Duration::from_millis(2500));
//! assert_eq!(config.debug_namespace, "echo");
//! ```

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default resource loading timeout (10 sec).
pub const DEFAULT_ERROR_TIMEOUT_MS: u64 = 10_000;

/// Default debounce applied to scroll/resize notifications (50 ms).
pub const DEFAULT_VIEWPORT_CHANGE_TIMEOUT_MS: u64 = 50;

/// Configuration shared by the loader and the bootstrap layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// SDK version inserted as the `sdk/v<version>` path segment.
    pub version: String,
    /// CDN base URL. A protocol-relative template (`//cdn.host/`) is
    /// prefixed with the page scheme when the resolver is built.
    pub cdn_base_url: String,
    /// How long a download batch may take before it is treated as complete.
    pub error_timeout_ms: u64,
    /// Debounce applied to viewport change notifications.
    pub viewport_change_timeout_ms: u64,
    /// Namespace of the URL-hash debug override (`<namespace>.debug:true`).
    pub debug_namespace: String,
    /// Name of the cookie persisting the debug flag.
    pub debug_cookie: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            cdn_base_url: "//cdn.echoenabled.com/".to_string(),
            error_timeout_ms: DEFAULT_ERROR_TIMEOUT_MS,
            viewport_change_timeout_ms: DEFAULT_VIEWPORT_CHANGE_TIMEOUT_MS,
            debug_namespace: "echo".to_string(),
            debug_cookie: "echo-debug".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value breaks an invariant.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cdn_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "cdn_base_url",
                reason: "must not be empty".into(),
            });
        }
        if self.version.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "version",
                reason: "must not be empty".into(),
            });
        }
        if self.error_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "error_timeout_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if self.debug_namespace.is_empty() {
            return Err(ConfigError::Invalid {
                field: "debug_namespace",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Sets the SDK version segment.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the CDN base URL template.
    #[must_use]
    pub fn with_cdn_base_url(mut self, url: impl Into<String>) -> Self {
        self.cdn_base_url = url.into();
        self
    }

    /// Sets the default download error timeout.
    #[must_use]
    pub fn with_error_timeout(mut self, timeout: Duration) -> Self {
        self.error_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the viewport change debounce.
    #[must_use]
    pub fn with_viewport_change_timeout(mut self, timeout: Duration) -> Self {
        self.viewport_change_timeout_ms =
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the default download error timeout.
    #[must_use]
    pub fn error_timeout(&self) -> Duration {
        Duration::from_millis(self.error_timeout_ms)
    }

    /// Returns the viewport change debounce.
    #[must_use]
    pub fn viewport_change_timeout(&self) -> Duration {
        Duration::from_millis(self.viewport_change_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = LoaderConfig::default();
        assert_eq!(config.error_timeout(), Duration::from_secs(10));
        assert_eq!(config.viewport_change_timeout(), Duration::from_millis(50));
        assert_eq!(config.debug_cookie, "echo-debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = LoaderConfig::from_json(r#"{ "version": "3.1.4" }"#).unwrap();
        assert_eq!(config.version, "3.1.4");
        assert_eq!(config.error_timeout_ms, DEFAULT_ERROR_TIMEOUT_MS);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = LoaderConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = LoaderConfig::from_json(r#"{ "error_timeout_ms": 0 }"#).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "error_timeout_ms"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let config = LoaderConfig::new().with_cdn_base_url("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn duration_builders_round_to_millis() {
        let config = LoaderConfig::new()
            .with_error_timeout(Duration::from_millis(1500))
            .with_viewport_change_timeout(Duration::from_millis(20));
        assert_eq!(config.error_timeout_ms, 1500);
        assert_eq!(config.viewport_change_timeout_ms, 20);
    }
}
