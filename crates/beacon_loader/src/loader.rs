//! The [`Loader`] facade.
//!
//! A `Loader` owns the ready-state table, the pending-request queue, and the
//! download scheduler, and exposes the operations collaborators use:
//!
//! | Operation | Purpose |
//! |-----------|---------|
//! | [`get_url`](Loader::get_url) | Canonicalize a logical reference |
//! | [`download`](Loader::download) | Load resources, then run a callback |
//! | [`load`](Loader::load) | Load resources, then resolve a future |
//! | [`is_ready`](Loader::is_ready) | Query readiness without side effects |
//! | [`is_debug`](Loader::is_debug) | Read the debug flag |
//!
//! # Submission
//!
//! 1. An empty resource set completes synchronously: no queue entry, no
//!    download, no state change.
//! 2. Otherwise the request is appended to the queue.
//! 3. URLs that are neither ready, loading, nor satisfied by a loaded check
//!    are marked loading (each at most once, even across concurrent
//!    submissions) and handed to the scheduler as one batch.
//! 4. With nothing to download, a dispatch pass runs right away. That covers
//!    both "already ready" (the callback fires before `download` returns) and
//!    "already in flight" (the request waits for the batch that owns it).
//!
//! When a batch completes its URLs are marked ready *before* the dispatch
//! pass re-scans the whole queue. The pass updates the queue first and only
//! then runs the released callbacks, in submission order, with no lock held.
//! Callbacks may therefore submit again freely.
//!
//! # Example
//!
//! ```
//! use beacon_loader::prelude::*;
//! use beacon_loader::testing::RecordingExecutor;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), LoaderError> {
//! let executor = RecordingExecutor::new();
//! let loader = Loader::builder(executor.clone()).build()?;
//!
//! let first = loader.load(["environment.pack.js"]);
//! let second = loader.load(["environment.pack.js"]);
//! first.await;
//! second.await;
//!
//! assert_eq!(executor.batches().len(), 1);
//! # Ok(())
//! # }
//! ```

use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use core::time::Duration;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::config::LoaderConfig;
use crate::debug::DebugFlag;
use crate::descriptor::{ResolvedResource, ResourceDescriptor};
use crate::error::LoaderError;
use crate::queue::{Completion, PendingQueue};
use crate::scheduler::{BatchExecutor, DownloadBatch, DownloadScheduler};
use crate::state::{ReadyStateTable, ResourceState};
use crate::url::{CanonicalUrl, Scheme, UrlResolver};

/// Boxed completion callback accepted by [`Loader::download_with`].
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

// ─────────────────────────────────────────────────────────────────────────────
// DownloadOptions
// ─────────────────────────────────────────────────────────────────────────────

/// Per-call download options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    error_timeout: Option<Duration>,
}

impl DownloadOptions {
    /// Creates options that inherit every value from the loader config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the error timeout for the batch this call schedules.
    ///
    /// A zero timeout means the configured one.
    #[must_use]
    pub fn with_error_timeout(mut self, timeout: Duration) -> Self {
        self.error_timeout = Some(timeout);
        self
    }

    /// Returns the overridden error timeout, if any.
    #[must_use]
    pub fn error_timeout(&self) -> Option<Duration> {
        self.error_timeout
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LoaderState
// ─────────────────────────────────────────────────────────────────────────────

/// Mutable state exclusively owned by one [`Loader`].
#[derive(Debug, Default)]
pub struct LoaderState {
    table: ReadyStateTable,
    queue: PendingQueue,
}

impl LoaderState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates state seeded with an existing ready-state table.
    #[must_use]
    pub fn with_table(table: ReadyStateTable) -> Self {
        Self {
            table,
            queue: PendingQueue::new(),
        }
    }

    /// Returns the ready-state table.
    #[must_use]
    pub fn table(&self) -> &ReadyStateTable {
        &self.table
    }

    /// Returns the pending-request queue.
    #[must_use]
    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LoaderBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for [`Loader`].
pub struct LoaderBuilder {
    config: LoaderConfig,
    scheme: Scheme,
    debug: DebugFlag,
    executor: Arc<dyn BatchExecutor>,
    runtime: Option<Handle>,
    state: LoaderState,
    present: Vec<String>,
}

impl fmt::Debug for LoaderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderBuilder")
            .field("config", &self.config)
            .field("scheme", &self.scheme)
            .field("debug", &self.debug.get())
            .field("present", &self.present)
            .finish_non_exhaustive()
    }
}

impl LoaderBuilder {
    fn new(executor: Arc<dyn BatchExecutor>) -> Self {
        Self {
            config: LoaderConfig::default(),
            scheme: Scheme::default(),
            debug: DebugFlag::default(),
            executor,
            runtime: None,
            state: LoaderState::default(),
            present: Vec::new(),
        }
    }

    /// Returns the configuration the loader will be built with.
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the page scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the page scheme from a page protocol string such as `"https:"`.
    #[must_use]
    pub fn with_page_protocol(self, protocol: &str) -> Self {
        self.with_scheme(Scheme::from_page_protocol(protocol))
    }

    /// Sets the initial debug mode.
    #[must_use]
    pub fn with_debug(self, enabled: bool) -> Self {
        self.debug.set(enabled);
        self
    }

    /// Shares an existing debug flag with the loader.
    #[must_use]
    pub fn with_debug_flag(mut self, flag: DebugFlag) -> Self {
        self.debug = flag;
        self
    }

    /// Sets the runtime download batches are driven on.
    ///
    /// Defaults to the runtime current at [`build`](Self::build) time.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Injects pre-existing state.
    #[must_use]
    pub fn with_state(mut self, state: LoaderState) -> Self {
        self.state = state;
        self
    }

    /// Records references already present on the page.
    ///
    /// They are marked ready at build time and never downloaded.
    #[must_use]
    pub fn with_present<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.present.extend(references.into_iter().map(Into::into));
        self
    }

    /// Builds the loader.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Config`] if the configuration is invalid and
    /// [`LoaderError::NoRuntime`] if no runtime was given and none is running.
    pub fn build(self) -> Result<Loader, LoaderError> {
        self.config.validate()?;

        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| LoaderError::NoRuntime)?,
        };

        let resolver = UrlResolver::new(self.scheme, &self.config, self.debug.clone());
        let mut state = self.state;
        let present: Vec<CanonicalUrl> = self
            .present
            .iter()
            .map(|reference| resolver.resolve(reference, true))
            .collect();
        state.table.mark_ready(&present);

        tracing::debug!(
            base_url = resolver.base_url(),
            scheme = %self.scheme,
            debug = self.debug.get(),
            present = present.len(),
            "loader built"
        );

        Ok(Loader {
            inner: Arc::new(LoaderInner {
                scheduler: DownloadScheduler::new(self.executor, runtime.clone()),
                config: self.config,
                debug: self.debug,
                resolver,
                state: Mutex::new(state),
                runtime,
            }),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loader
// ─────────────────────────────────────────────────────────────────────────────

struct LoaderInner {
    config: LoaderConfig,
    debug: DebugFlag,
    resolver: UrlResolver,
    state: Mutex<LoaderState>,
    scheduler: Arc<DownloadScheduler>,
    runtime: Handle,
}

/// Resource loading and deduplication engine.
///
/// Cloning is cheap and shares the same state; keep one logical loader per
/// page and hand clones to collaborators.
///
/// Loaded checks run while the loader's state lock is held and must not call
/// back into the same loader. Formatting it with `{:?}` is the exception and
/// omits the table and queue counts while the lock is taken.
#[derive(Clone)]
pub struct Loader {
    inner: Arc<LoaderInner>,
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Loader");
        debug
            .field("base_url", &self.inner.resolver.base_url())
            .field("debug", &self.inner.debug.get());
        // Loaded checks format loaders while the state lock is held.
        match self.inner.state.try_lock() {
            Some(state) => debug
                .field("known_urls", &state.table.len())
                .field("pending", &state.queue.len()),
            None => debug.field("state", &format_args!("<locked>")),
        };
        debug.field("scheduler", &self.inner.scheduler).finish()
    }
}

impl Loader {
    /// Starts building a loader around `executor`.
    pub fn builder<E: BatchExecutor>(executor: E) -> LoaderBuilder {
        LoaderBuilder::new(Arc::new(executor))
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    /// Returns the runtime download batches are driven on.
    #[must_use]
    pub fn runtime(&self) -> &Handle {
        &self.inner.runtime
    }

    /// Returns the page scheme.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.inner.resolver.scheme()
    }

    /// Returns whether debug mode is on.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.inner.debug.get()
    }

    /// Returns the shared debug flag.
    #[must_use]
    pub fn debug_flag(&self) -> &DebugFlag {
        &self.inner.debug
    }

    /// Turns debug mode on or off. Affects future URL resolutions only.
    pub fn set_debug(&self, enabled: bool) {
        self.inner.debug.set(enabled);
    }

    /// Canonicalizes `reference`, using the dev build when debug mode is on.
    #[must_use]
    pub fn get_url(&self, reference: &str) -> CanonicalUrl {
        self.get_url_with(reference, true)
    }

    /// Canonicalizes `reference`.
    ///
    /// Pass `dev_variant = false` for assets that have no dev build, such as
    /// images.
    #[must_use]
    pub fn get_url_with(&self, reference: &str, dev_variant: bool) -> CanonicalUrl {
        self.inner.resolver.resolve(reference, dev_variant)
    }

    /// Returns whether every descriptor is ready. Never mutates state.
    #[must_use]
    pub fn is_ready(&self, resources: &[ResourceDescriptor]) -> bool {
        let state = self.inner.state.lock();
        state.table.is_ready(&self.inner.resolver, resources)
    }

    /// Returns the table state of `reference`'s canonical URL.
    #[must_use]
    pub fn resource_state(&self, reference: &str) -> Option<ResourceState> {
        let url = self.get_url(reference);
        self.inner.state.lock().table.state(url.as_str())
    }

    /// Returns the number of requests still waiting.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Loads `resources`, then runs `callback`.
    ///
    /// The callback runs synchronously, before this returns, when the set is
    /// empty or already ready. Otherwise it runs from the completion of the
    /// batch that makes the set ready.
    pub fn download<I, F>(&self, resources: I, callback: F)
    where
        I: IntoIterator,
        I::Item: Into<ResourceDescriptor>,
        F: FnOnce() + Send + 'static,
    {
        self.submit(
            collect(resources),
            Completion::Callback(Box::new(callback)),
            DownloadOptions::default(),
        );
    }

    /// Loads `resources` with explicit options and an optional callback.
    pub fn download_with<I>(&self, resources: I, callback: Option<Callback>, options: DownloadOptions)
    where
        I: IntoIterator,
        I::Item: Into<ResourceDescriptor>,
    {
        let completion = callback.map_or(Completion::Silent, Completion::Callback);
        self.submit(collect(resources), completion, options);
    }

    /// Loads `resources`, resolving the returned future once they are ready.
    ///
    /// The load is issued immediately; the future only observes it.
    pub fn load<I>(&self, resources: I) -> Download
    where
        I: IntoIterator,
        I::Item: Into<ResourceDescriptor>,
    {
        self.load_with(resources, DownloadOptions::default())
    }

    /// Like [`load`](Self::load) with explicit options.
    pub fn load_with<I>(&self, resources: I, options: DownloadOptions) -> Download
    where
        I: IntoIterator,
        I::Item: Into<ResourceDescriptor>,
    {
        let (sender, receiver) = oneshot::channel();
        self.submit(collect(resources), Completion::Notify(sender), options);
        Download { receiver }
    }

    fn submit(&self, resources: Vec<ResourceDescriptor>, completion: Completion, options: DownloadOptions) {
        if resources.is_empty() {
            completion.fire();
            return;
        }

        let inner = &*self.inner;
        let urls = {
            let mut state = inner.state.lock();
            let LoaderState { table, queue } = &mut *state;

            let mut urls = Vec::new();
            let mut resolved = Vec::with_capacity(resources.len());
            for descriptor in resources {
                let url = inner.resolver.resolve(descriptor.url(), true);
                if table.state(url.as_str()).is_none() && !descriptor.is_loaded() {
                    table.mark_loading([&url]);
                    urls.push(url.clone());
                }
                resolved.push(ResolvedResource { descriptor, url });
            }
            queue.push(resolved, completion);
            urls
        };

        if urls.is_empty() {
            self.dispatch();
            return;
        }

        let error_timeout = options
            .error_timeout()
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or_else(|| inner.config.error_timeout());
        let batch = DownloadBatch::new(urls.clone(), error_timeout);
        let loader = self.clone();
        inner
            .scheduler
            .schedule(batch, move || loader.complete(&urls));
    }

    /// Completion handler of a batch: mark ready, then dispatch.
    fn complete(&self, urls: &[CanonicalUrl]) {
        self.inner.state.lock().table.mark_ready(urls);
        self.dispatch();
    }

    /// Releases every request whose resources are now ready.
    fn dispatch(&self) {
        let (released, pending) = {
            let mut state = self.inner.state.lock();
            let LoaderState { table, queue } = &mut *state;
            let released = queue.take_ready(|resource| table.is_resolved_ready(resource));
            (released, queue.len())
        };

        if !released.is_empty() {
            tracing::trace!(released = released.len(), pending, "dispatch pass");
        }

        for completion in released {
            if std::panic::catch_unwind(AssertUnwindSafe(|| completion.fire())).is_err() {
                tracing::error!(pending, "download callback panicked");
            }
        }
    }
}

fn collect<I>(resources: I) -> Vec<ResourceDescriptor>
where
    I: IntoIterator,
    I::Item: Into<ResourceDescriptor>,
{
    resources.into_iter().map(Into::into).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Download
// ─────────────────────────────────────────────────────────────────────────────

/// Future returned by [`Loader::load`].
///
/// Resolves in the same dispatch pass, and in the same submission order, as
/// callbacks would fire. Dropping it does not cancel the load.
#[derive(Debug)]
pub struct Download {
    receiver: oneshot::Receiver<()>,
}

impl Future for Download {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A dropped sender means the loader went away; nothing left to wait for.
        Pin::new(&mut self.receiver).poll(cx).map(|_| ())
    }
}
