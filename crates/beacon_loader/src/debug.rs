//! Shared debug flag.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide debug switch.
///
/// Cloning shares the underlying flag. When on, URLs requested with the
/// development variant resolve to the non-minified `/dev` build. Flipping it
/// only changes future canonicalizations.
#[derive(Debug, Clone, Default)]
pub struct DebugFlag(Arc<AtomicBool>);

impl DebugFlag {
    /// Creates a flag with the given initial value.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    /// Returns whether debug mode is on.
    #[must_use]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Turns debug mode on or off.
    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = DebugFlag::new(false);
        let other = flag.clone();
        other.set(true);
        assert!(flag.get());
    }
}
