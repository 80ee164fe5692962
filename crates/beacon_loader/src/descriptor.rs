//! Resource descriptors.
//!
//! A [`ResourceDescriptor`] names a loadable asset by logical reference and
//! may carry a custom readiness check. The check lets callers recognize a
//! resource that became available by other means (for example, already
//! bundled into the page) so that no download is issued for it.

use core::fmt;
use std::sync::Arc;

use crate::url::CanonicalUrl;

/// Custom "is this already loaded" query.
///
/// Must be pure and repeatable: the engine may call it any number of times,
/// in any order relative to its own table checks.
pub type LoadedCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// A loadable asset plus its optional readiness check.
#[derive(Clone)]
pub struct ResourceDescriptor {
    url: String,
    loaded: Option<LoadedCheck>,
}

impl ResourceDescriptor {
    /// Creates a descriptor for a logical reference.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            loaded: None,
        }
    }

    /// Attaches a custom readiness check.
    ///
    /// # Example
    ///
    /// ```
    /// use beacon_loader::ResourceDescriptor;
    /// use core::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    ///
    /// let defined = Arc::new(AtomicBool::new(true));
    /// let flag = Arc::clone(&defined);
    /// let labels = ResourceDescriptor::new("labels.js")
    ///     .with_loaded_check(move || flag.load(Ordering::SeqCst));
    ///
    /// assert!(labels.is_loaded());
    /// ```
    #[must_use]
    pub fn with_loaded_check<F>(mut self, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.loaded = Some(Arc::new(check));
        self
    }

    /// Returns the logical reference.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns whether a custom readiness check is attached.
    #[must_use]
    pub fn has_loaded_check(&self) -> bool {
        self.loaded.is_some()
    }

    /// Runs the custom readiness check, `false` when there is none.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.as_ref().is_some_and(|check| check())
    }

    /// Returns the kind of asset this descriptor points at.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        ResourceKind::of(&self.url)
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("url", &self.url)
            .field("loaded_check", &self.loaded.is_some())
            .finish()
    }
}

impl From<&str> for ResourceDescriptor {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for ResourceDescriptor {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

/// A descriptor paired with the canonical URL it resolved to at submission.
///
/// Pending requests keep the URL they were submitted under, so flipping the
/// debug flag while a request waits cannot strand it on a different key.
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    /// The caller's descriptor.
    pub descriptor: ResourceDescriptor,
    /// Its canonical URL.
    pub url: CanonicalUrl,
}

/// Kind of asset, as far as an injection primitive cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// JavaScript, injected as a script element.
    Script,
    /// CSS, injected as a stylesheet link.
    Stylesheet,
}

impl ResourceKind {
    /// Classifies a URL by its path extension, ignoring query and fragment.
    #[must_use]
    pub fn of(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let is_css = path
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("css"));
        if is_css { Self::Stylesheet } else { Self::Script }
    }
}
