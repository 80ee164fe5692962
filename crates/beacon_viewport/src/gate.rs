//! Debounced visibility gate.
//!
//! [`VisibilityGate::init_when_visible`] runs an action once a target is in
//! the viewport:
//!
//! 1. If the predicate already holds, the action runs synchronously and no
//!    subscription is made.
//! 2. Otherwise the gate subscribes to viewport events. Each event restarts
//!    a debounce timer; when the timer expires the predicate is evaluated.
//! 3. The first successful evaluation unsubscribes and runs the action. The
//!    action never runs twice.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use beacon_viewport::{ViewportEvent, ViewportEvents, VisibilityGate};
//! use core::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), beacon_viewport::GateError> {
//! let gate = VisibilityGate::current(Duration::from_millis(50))?;
//! let events = ViewportEvents::new();
//! let visible = Arc::new(AtomicBool::new(false));
//!
//! let flag = Arc::clone(&visible);
//! let watch = gate.init_when_visible((), &events, move |_| flag.load(Ordering::SeqCst), || {
//!     tracing::info!("canvas visible");
//! });
//! assert!(watch.is_pending());
//!
//! visible.store(true, Ordering::SeqCst);
//! events.notify(ViewportEvent::Scroll);
//! watch.finished().await;
//! # Ok(())
//! # }
//! ```

use core::time::Duration;

use futures::StreamExt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::GateError;
use crate::events::{ViewportEvents, ViewportSubscription};

/// Outcome of [`VisibilityGate::init_when_visible`].
#[derive(Debug)]
pub enum VisibilityWatch {
    /// The target was visible; the action already ran.
    Immediate,
    /// Waiting for a viewport change that makes the target visible.
    Pending(JoinHandle<()>),
}

impl VisibilityWatch {
    /// Returns whether the action is still waiting to run.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        match self {
            Self::Immediate => false,
            Self::Pending(handle) => !handle.is_finished(),
        }
    }

    /// Stops watching. The action will not run unless it already has.
    pub fn abort(&self) {
        if let Self::Pending(handle) = self {
            handle.abort();
        }
    }

    /// Waits until the watch ends, by running its action or otherwise.
    pub async fn finished(self) {
        if let Self::Pending(handle) = self {
            // Aborted and panicked watches also count as finished.
            let _ = handle.await;
        }
    }
}

/// Spawns debounced visibility watches on a runtime.
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    debounce: Duration,
    runtime: Handle,
}

impl VisibilityGate {
    /// Creates a gate that debounces viewport changes by `debounce`.
    #[must_use]
    pub fn new(debounce: Duration, runtime: Handle) -> Self {
        Self { debounce, runtime }
    }

    /// Creates a gate on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::NoRuntime`] outside a tokio runtime.
    pub fn current(debounce: Duration) -> Result<Self, GateError> {
        let runtime = Handle::try_current().map_err(|_| GateError::NoRuntime)?;
        Ok(Self::new(debounce, runtime))
    }

    /// Returns the debounce interval.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Runs `on_visible` once `is_visible(&target)` holds.
    pub fn init_when_visible<T, P, F>(
        &self,
        target: T,
        events: &ViewportEvents,
        is_visible: P,
        on_visible: F,
    ) -> VisibilityWatch
    where
        T: Send + 'static,
        P: Fn(&T) -> bool + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        if is_visible(&target) {
            on_visible();
            return VisibilityWatch::Immediate;
        }

        tracing::debug!(debounce_ms = self.debounce.as_millis(), "deferred until visible");
        let subscription = events.subscribe();
        let debounce = self.debounce;
        VisibilityWatch::Pending(self.runtime.spawn(async move {
            if watch(subscription, debounce, move || is_visible(&target)).await {
                on_visible();
            }
        }))
    }
}

/// Resolves `true` once `is_visible` holds after a debounced change, or
/// `false` when the event source goes away first.
async fn watch<P>(mut subscription: ViewportSubscription, debounce: Duration, is_visible: P) -> bool
where
    P: Fn() -> bool,
{
    while subscription.next().await.is_some() {
        let mut source_closed = false;
        loop {
            tokio::select! {
                event = subscription.next() => {
                    if event.is_none() {
                        source_closed = true;
                        tokio::time::sleep(debounce).await;
                        break;
                    }
                }
                () = tokio::time::sleep(debounce) => break,
            }
        }

        if is_visible() {
            tracing::debug!("target visible");
            return true;
        }
        if source_closed {
            return false;
        }
    }
    false
}
