//! Error types for loader construction and configuration.
//!
//! The loading paths themselves never fail: a slow or broken resource
//! degrades to "the callback fires anyway". Errors only surface while a
//! [`Loader`](crate::Loader) is being configured and built.

/// Errors raised while parsing or validating a [`LoaderConfig`](crate::LoaderConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for the schema.
    #[error("failed to parse loader config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value breaks an invariant the engine relies on.
    #[error("invalid loader config `{field}`: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Errors raised while building a [`Loader`](crate::Loader).
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// No tokio runtime was supplied and none is running on this thread.
    #[error("no async runtime available to drive download batches")]
    NoRuntime,

    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
