//! Tracing subscriber setup.
//!
//! [`TracingSetup`] installs a `tracing-subscriber` registry with an
//! [`EnvFilter`] and one formatting layer, and reports what it installed as a
//! [`TracingConfig`].
//!
//! # Filter resolution
//!
//! 1. An explicit [`with_env_filter`](TracingSetup::with_env_filter) string.
//! 2. Otherwise the `BEACON_LOG` environment variable, when
//!    [`from_env`](TracingSetup::from_env) was requested.
//! 3. Otherwise the configured maximum [`Level`].
//!
//! An unparsable directive string falls back to the level.
//!
//! # Example
//!
//! ```
//! use beacon_core::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! let config = TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("beacon_loader=trace,beacon_viewport=info")
//!     .init();
//!
//! assert_eq!(config.format, TracingFormat::Compact);
//! ```

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable consulted by [`TracingSetup::from_env`].
pub const ENV_VAR: &str = "BEACON_LOG";

type FormatLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable multi-line output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// What [`TracingSetup::init`] installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// The configured maximum log level.
    pub level: Level,
    /// The output format.
    pub format: TracingFormat,
    /// The filter directives in effect.
    pub filter: String,
    /// Whether span enter/exit events are emitted.
    pub span_events: bool,
    /// `false` when another subscriber was already installed.
    pub installed: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingSetup
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the process-wide tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingSetup {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    read_env: bool,
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            read_env: false,
            span_events: false,
        }
    }
}

impl TracingSetup {
    /// Creates a setup with `INFO` level and pretty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets filter directives, e.g. `beacon_loader=trace,beacon_env=warn`.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Reads filter directives from [`ENV_VAR`] when no explicit filter is set.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        self.read_env = true;
        self
    }

    /// Emits span enter/exit events.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the filter directives [`init`](Self::init) would install.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        let requested = self
            .env_filter
            .clone()
            .or_else(|| self.read_env.then(|| std::env::var(ENV_VAR).ok()).flatten());

        match requested {
            Some(directives) if EnvFilter::try_new(&directives).is_ok() => directives,
            _ => self.level.as_str().to_ascii_lowercase(),
        }
    }

    /// Installs the subscriber.
    ///
    /// Idempotent: if a global subscriber already exists, nothing changes and
    /// the returned config reports `installed: false`.
    pub fn init(self) -> TracingConfig {
        let filter = self.filter_directives();
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let layer: FormatLayer = match self.format {
            TracingFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_span_events(span_events)
                .boxed(),
            TracingFormat::Compact => tracing_subscriber::fmt::layer()
                .compact()
                .with_span_events(span_events)
                .boxed(),
            TracingFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(span_events)
                .boxed(),
        };

        let installed = tracing_subscriber::registry()
            .with(EnvFilter::new(&filter))
            .with(layer)
            .try_init()
            .is_ok();

        if installed {
            tracing::info!(level = %self.level, format = ?self.format, %filter, "tracing initialized");
        }

        TracingConfig {
            level: self.level,
            format: self.format,
            filter,
            span_events: self.span_events,
            installed,
        }
    }
}
