//! Error types for environment inputs.

/// Errors raised while reading environment inputs.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// A canvas id has no primary part.
    #[error("invalid canvas id `{0}`: missing primary identifier")]
    InvalidCanvasId(String),
}
