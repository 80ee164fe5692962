//! Error types for bootstrap.

/// Errors raised while reading application descriptions.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The application description is not valid JSON for the schema.
    #[error("failed to parse application description: {0}")]
    Parse(#[from] serde_json::Error),

    /// The application names no component to construct.
    #[error("application description has no component name")]
    MissingComponent,
}
