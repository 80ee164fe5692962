//! Download scheduler.
//!
//! The [`DownloadScheduler`] runs physical download batches strictly one at
//! a time. Batch N+1 does not reach the [`BatchExecutor`] until batch N's
//! completion handler has fully run. Two-phase (preload, then execute)
//! script injectors corrupt their bookkeeping when a second load starts
//! while a synchronous script from an earlier load is preloaded but not yet
//! executed, so the non-overlap rule holds for every executor.
//!
//! # State machine
//!
//! ```text
//! Idle --schedule--> Executing --batch done, queue empty--> Idle
//!                        ^                |
//!                        +--next batch----+
//! ```
//!
//! # Failure semantics
//!
//! A batch whose executor reports an error, or that exceeds its error
//! timeout, still completes. Its completion handler always runs, so the
//! URLs it carried are marked ready and the queue can never stall on one bad
//! resource.

use core::fmt;
use core::time::Duration;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::url::CanonicalUrl;

// ─────────────────────────────────────────────────────────────────────────────
// DownloadBatch
// ─────────────────────────────────────────────────────────────────────────────

/// One serialized group of physical downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadBatch {
    urls: Vec<CanonicalUrl>,
    error_timeout: Duration,
}

impl DownloadBatch {
    /// Creates a batch for `urls` bounded by `error_timeout`.
    #[must_use]
    pub fn new(urls: Vec<CanonicalUrl>, error_timeout: Duration) -> Self {
        Self {
            urls,
            error_timeout,
        }
    }

    /// Returns the URLs to download.
    #[must_use]
    pub fn urls(&self) -> &[CanonicalUrl] {
        &self.urls
    }

    /// Returns how long the batch may take before it is treated as done.
    #[must_use]
    pub fn error_timeout(&self) -> Duration {
        self.error_timeout
    }

    /// Renders each URL with the injector's timeout directive,
    /// e.g. `timeout=10000!https://cdn/sdk/v3/loader.js`.
    #[must_use]
    pub fn directives(&self) -> Vec<String> {
        let prefix = format!("timeout={}!", self.error_timeout.as_millis());
        self.urls
            .iter()
            .map(|url| format!("{prefix}{url}"))
            .collect()
    }

    /// Returns the number of URLs in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns whether the batch carries no URL.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BatchExecutor
// ─────────────────────────────────────────────────────────────────────────────

/// Errors a [`BatchExecutor`] may report.
///
/// Reported errors are logged; they never prevent the batch from completing.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Some resources failed to load.
    #[error("failed to load {} resource(s): {}", .urls.len(), join_urls(.urls))]
    Failed {
        /// The URLs that failed.
        urls: Vec<CanonicalUrl>,
    },

    /// The injection primitive itself failed.
    #[error("batch executor error: {0}")]
    Executor(String),
}

fn join_urls(urls: &[CanonicalUrl]) -> String {
    urls.iter()
        .map(CanonicalUrl::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Platform primitive that physically downloads a batch.
///
/// The contract: accept one batch, return exactly once when the whole batch
/// is done (loaded, failed, or timed out), and expect no further call until
/// that return. The scheduler upholds the second half.
///
/// # Example
///
/// ```
/// use beacon_loader::{BatchError, BatchExecutor, DownloadBatch};
///
/// struct LoggingExecutor;
///
/// #[async_trait::async_trait]
/// impl BatchExecutor for LoggingExecutor {
///     async fn execute(&self, batch: &DownloadBatch) -> Result<(), BatchError> {
///         for directive in batch.directives() {
///             tracing::info!(%directive, "injecting");
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait BatchExecutor: Send + Sync + 'static {
    /// Downloads every URL in `batch`.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] to report failed resources. The batch is
    /// treated as complete either way.
    async fn execute(&self, batch: &DownloadBatch) -> Result<(), BatchError>;
}

#[async_trait]
impl<T: BatchExecutor + ?Sized> BatchExecutor for Arc<T> {
    async fn execute(&self, batch: &DownloadBatch) -> Result<(), BatchError> {
        (**self).execute(batch).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DownloadScheduler
// ─────────────────────────────────────────────────────────────────────────────

type CompletionHandler = Box<dyn FnOnce() + Send + 'static>;

struct QueuedBatch {
    batch: DownloadBatch,
    on_complete: CompletionHandler,
}

#[derive(Default)]
struct SchedulerState {
    queue: VecDeque<QueuedBatch>,
    executing: bool,
}

/// FIFO of download batches with at most one executing at a time.
pub struct DownloadScheduler {
    executor: Arc<dyn BatchExecutor>,
    runtime: Handle,
    state: Mutex<SchedulerState>,
}

impl fmt::Debug for DownloadScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DownloadScheduler")
            .field("executing", &state.executing)
            .field("queued", &state.queue.len())
            .finish_non_exhaustive()
    }
}

impl DownloadScheduler {
    /// Creates a scheduler driving `executor` on `runtime`.
    #[must_use]
    pub fn new(executor: Arc<dyn BatchExecutor>, runtime: Handle) -> Arc<Self> {
        Arc::new(Self {
            executor,
            runtime,
            state: Mutex::new(SchedulerState::default()),
        })
    }

    /// Queues `batch`; `on_complete` runs once the batch is done.
    ///
    /// Starts executing immediately when the scheduler is idle, otherwise
    /// the batch waits behind the ones already queued.
    pub fn schedule<F>(self: &Arc<Self>, batch: DownloadBatch, on_complete: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let urls = batch.len();
        let start = {
            let mut state = self.state.lock();
            state.queue.push_back(QueuedBatch {
                batch,
                on_complete: Box::new(on_complete),
            });
            !core::mem::replace(&mut state.executing, true)
        };

        tracing::debug!(urls, start, "download batch scheduled");

        if start {
            self.runtime.spawn(Arc::clone(self).drain());
        }
    }

    /// Returns whether a batch is currently executing.
    #[must_use]
    pub fn is_executing(&self) -> bool {
        self.state.lock().executing
    }

    /// Returns the number of batches waiting to start.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }

    async fn drain(self: Arc<Self>) {
        loop {
            let next = {
                let mut state = self.state.lock();
                match state.queue.pop_front() {
                    Some(next) => next,
                    None => {
                        state.executing = false;
                        return;
                    }
                }
            };
            self.run(next).await;
        }
    }

    async fn run(&self, queued: QueuedBatch) {
        let QueuedBatch { batch, on_complete } = queued;
        let timeout = batch.error_timeout();
        let timeout_ms = timeout.as_millis();

        tracing::debug!(urls = ?batch.urls(), timeout_ms, "download batch started");

        match tokio::time::timeout(timeout, self.executor.execute(&batch)).await {
            Ok(Ok(())) => tracing::debug!(urls = batch.len(), "download batch finished"),
            Ok(Err(BatchError::Failed { urls })) => {
                for url in &urls {
                    tracing::warn!(%url, "resource failed to load, treating as complete");
                }
            }
            Ok(Err(err)) => tracing::warn!(error = %err, "download batch finished with failures"),
            Err(_) => tracing::warn!(
                urls = ?batch.urls(),
                timeout_ms,
                "download batch timed out, treating as complete"
            ),
        }

        if std::panic::catch_unwind(AssertUnwindSafe(on_complete)).is_err() {
            tracing::error!(urls = ?batch.urls(), "download completion handler panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> CanonicalUrl {
        CanonicalUrl::new(s)
    }

    #[test]
    fn directives_prefix_every_url() {
        let batch = DownloadBatch::new(
            vec![url("https://x/a.js"), url("https://x/b.css")],
            Duration::from_millis(1000),
        );
        assert_eq!(
            batch.directives(),
            vec!["timeout=1000!https://x/a.js", "timeout=1000!https://x/b.css"]
        );
    }

    #[test]
    fn failed_error_lists_urls() {
        let err = BatchError::Failed {
            urls: vec![url("https://x/a.js"), url("https://x/b.js")],
        };
        assert_eq!(
            err.to_string(),
            "failed to load 2 resource(s): https://x/a.js, https://x/b.js"
        );
    }

    struct Instant;

    #[async_trait]
    impl BatchExecutor for Instant {
        async fn execute(&self, _batch: &DownloadBatch) -> Result<(), BatchError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn completion_runs_and_scheduler_goes_idle() {
        let scheduler = DownloadScheduler::new(Arc::new(Instant), Handle::current());
        let (tx, rx) = tokio::sync::oneshot::channel();

        scheduler.schedule(
            DownloadBatch::new(vec![url("https://x/a.js")], Duration::from_secs(1)),
            move || {
                let _ = tx.send(());
            },
        );
        assert!(scheduler.is_executing());

        rx.await.unwrap();
        tokio::task::yield_now().await;
        assert!(!scheduler.is_executing());
        assert_eq!(scheduler.queued(), 0);
    }
}
