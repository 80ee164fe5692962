//! Base runtime manifest.

use std::sync::Arc;

use beacon_loader::ResourceDescriptor;
use serde::{Deserialize, Serialize};

use crate::host::PageHost;

/// One base runtime resource and the global it defines once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Logical reference, resolved by the loader.
    pub url: String,
    /// Global whose presence means the resource is loaded.
    pub global: String,
}

impl ManifestEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(url: impl Into<String>, global: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            global: global.into(),
        }
    }
}

/// Ordered list of resources that make up the base runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentManifest {
    entries: Vec<ManifestEntry>,
}

impl Default for EnvironmentManifest {
    fn default() -> Self {
        Self {
            entries: vec![
                ManifestEntry::new("backplane.js", "Backplane"),
                ManifestEntry::new("third-party/jquery.pack.js", "Echo.jQuery"),
                ManifestEntry::new("environment.pack.js", "Echo.Utils"),
            ],
        }
    }
}

impl EnvironmentManifest {
    /// Creates a manifest from entries.
    #[must_use]
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    /// Returns the entries in load order.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Builds descriptors whose loaded checks ask `host` for each global.
    #[must_use]
    pub fn descriptors(&self, host: &Arc<dyn PageHost>) -> Vec<ResourceDescriptor> {
        self.entries
            .iter()
            .map(|entry| {
                let host = Arc::clone(host);
                let global = entry.global.clone();
                ResourceDescriptor::new(entry.url.as_str())
                    .with_loaded_check(move || host.is_defined(&global))
            })
            .collect()
    }
}
