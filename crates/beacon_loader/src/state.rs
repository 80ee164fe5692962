//! Resource ready-state table.
//!
//! [`ReadyStateTable`] is the single source of truth for deduplication. Each
//! canonical URL moves through `(absent) -> Loading -> Ready` and never
//! regresses. Readiness queries are read-only; only the explicit `mark_*`
//! operations mutate the table.

use hashbrown::HashMap;

use crate::descriptor::{ResolvedResource, ResourceDescriptor};
use crate::url::{CanonicalUrl, UrlResolver};

/// Lifecycle state of a requested URL.
///
/// Absence from the table means "not yet requested".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// A download batch containing the URL has been scheduled.
    Loading,
    /// A download was attempted and its batch completed.
    ///
    /// This records an *attempt*: failed and timed-out downloads end up here
    /// too. Use a loaded check on the descriptor to verify real success.
    Ready,
}

/// Map from canonical URL to [`ResourceState`].
#[derive(Debug, Default, Clone)]
pub struct ReadyStateTable {
    entries: HashMap<CanonicalUrl, ResourceState>,
}

impl ReadyStateTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state of `url`, `None` if it was never requested.
    #[must_use]
    pub fn state(&self, url: &str) -> Option<ResourceState> {
        self.entries.get(url).copied()
    }

    /// Returns whether `url` is marked ready.
    #[must_use]
    pub fn is_url_ready(&self, url: &str) -> bool {
        self.state(url) == Some(ResourceState::Ready)
    }

    /// Returns whether every descriptor is ready.
    ///
    /// A descriptor is ready when its canonical URL is marked ready or its
    /// custom loaded check reports true. An empty slice is vacuously ready.
    #[must_use]
    pub fn is_ready(&self, resolver: &UrlResolver, descriptors: &[ResourceDescriptor]) -> bool {
        descriptors.iter().all(|descriptor| {
            self.is_url_ready(resolver.resolve(descriptor.url(), true).as_str())
                || descriptor.is_loaded()
        })
    }

    /// Returns whether a resource resolved earlier is ready.
    ///
    /// Same rule as [`is_ready`](Self::is_ready), keyed by the URL captured
    /// at resolution time.
    #[must_use]
    pub fn is_resolved_ready(&self, resource: &ResolvedResource) -> bool {
        self.is_url_ready(resource.url.as_str()) || resource.descriptor.is_loaded()
    }

    /// Marks URLs as loading. URLs already ready stay ready.
    pub fn mark_loading<'a, I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = &'a CanonicalUrl>,
    {
        for url in urls {
            self.entries
                .entry(url.clone())
                .or_insert(ResourceState::Loading);
        }
    }

    /// Marks URLs as ready, whether or not they were loading.
    pub fn mark_ready<'a, I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = &'a CanonicalUrl>,
    {
        for url in urls {
            self.entries.insert(url.clone(), ResourceState::Ready);
        }
    }

    /// Returns the number of URLs ever requested.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no URL was ever requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
