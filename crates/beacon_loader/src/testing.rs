//! Test doubles for the loader.
//!
//! Enabled with the `test-utils` feature.

use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::scheduler::{BatchError, BatchExecutor, DownloadBatch};
use crate::url::CanonicalUrl;

type LoadEffect = Arc<dyn Fn() + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// RecordingExecutor
// ─────────────────────────────────────────────────────────────────────────────

/// [`BatchExecutor`] that records every batch it receives.
///
/// URLs are matched by suffix, so `"a.js"` matches
/// `https://cdn/sdk/v3/a.js`. Cloning shares the recording.
///
/// # Example
///
/// ```
/// use beacon_loader::testing::RecordingExecutor;
/// use core::time::Duration;
///
/// let executor = RecordingExecutor::new()
///     .with_delay(Duration::from_millis(5))
///     .failing("broken.js")
///     .hanging("never.js");
/// assert!(executor.batches().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    inner: Arc<Recording>,
}

#[derive(Default)]
struct Recording {
    delay: Mutex<Option<Duration>>,
    failing: Mutex<Vec<String>>,
    hanging: Mutex<Vec<String>>,
    effects: Mutex<Vec<(String, LoadEffect)>>,
    batches: Mutex<Vec<Vec<String>>>,
    in_flight: AtomicUsize,
    max_concurrent: AtomicUsize,
}

impl RecordingExecutor {
    /// Creates an executor that finishes every batch immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every batch take `delay` before it finishes.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.inner.delay.lock() = Some(delay);
        self
    }

    /// Reports URLs ending in `suffix` as failed.
    #[must_use]
    pub fn failing(self, suffix: impl Into<String>) -> Self {
        self.inner.failing.lock().push(suffix.into());
        self
    }

    /// Never finishes a batch containing a URL ending in `suffix`.
    #[must_use]
    pub fn hanging(self, suffix: impl Into<String>) -> Self {
        self.inner.hanging.lock().push(suffix.into());
        self
    }

    /// Runs `effect` whenever a URL ending in `suffix` loads successfully.
    ///
    /// Stands in for the side effects a real script has, such as defining a
    /// global that a loaded check looks for.
    #[must_use]
    pub fn on_load<F>(self, suffix: impl Into<String>, effect: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner
            .effects
            .lock()
            .push((suffix.into(), Arc::new(effect)));
        self
    }

    /// Returns every batch received so far, in order.
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.inner.batches.lock().clone()
    }

    /// Returns how many times a URL ending in `suffix` was downloaded.
    #[must_use]
    pub fn download_count(&self, suffix: &str) -> usize {
        self.inner
            .batches
            .lock()
            .iter()
            .flatten()
            .filter(|url| url.ends_with(suffix))
            .count()
    }

    /// Returns the number of batches executing right now.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Returns the highest number of batches ever executing at once.
    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.inner.max_concurrent.load(Ordering::SeqCst)
    }

    fn matches(patterns: &Mutex<Vec<String>>, url: &CanonicalUrl) -> bool {
        patterns
            .lock()
            .iter()
            .any(|suffix| url.as_str().ends_with(suffix.as_str()))
    }
}

struct InFlight<'a>(&'a Recording);

impl<'a> InFlight<'a> {
    fn enter(recording: &'a Recording) -> Self {
        let now = recording.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        recording.max_concurrent.fetch_max(now, Ordering::SeqCst);
        Self(recording)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BatchExecutor for RecordingExecutor {
    async fn execute(&self, batch: &DownloadBatch) -> Result<(), BatchError> {
        let recording = &*self.inner;
        let _guard = InFlight::enter(recording);
        recording.batches.lock().push(
            batch
                .urls()
                .iter()
                .map(|url| url.as_str().to_owned())
                .collect(),
        );

        let delay = *recording.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if batch
            .urls()
            .iter()
            .any(|url| Self::matches(&recording.hanging, url))
        {
            core::future::pending::<()>().await;
        }

        let failed: Vec<CanonicalUrl> = batch
            .urls()
            .iter()
            .filter(|url| Self::matches(&recording.failing, url))
            .cloned()
            .collect();

        let effects: Vec<LoadEffect> = recording
            .effects
            .lock()
            .iter()
            .filter(|(suffix, _)| {
                batch
                    .urls()
                    .iter()
                    .any(|url| url.as_str().ends_with(suffix.as_str()) && !failed.contains(url))
            })
            .map(|(_, effect)| Arc::clone(effect))
            .collect();
        for effect in effects {
            effect();
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(BatchError::Failed { urls: failed })
        }
    }
}
