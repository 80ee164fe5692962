//! Error types for visibility gating.

/// Errors raised while creating a [`VisibilityGate`](crate::VisibilityGate).
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No tokio runtime is running on this thread.
    #[error("no async runtime available to drive visibility watches")]
    NoRuntime,
}
