//! Shared helpers for `beacon_loader` integration tests.
//!
//! Import via `mod common;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use std::sync::Arc;
use std::time::Duration;

use beacon_loader::testing::RecordingExecutor;
use beacon_loader::{Loader, LoaderConfig};
use parking_lot::Mutex;

pub const BASE: &str = "http://cdn.example.com/sdk/v3/";

/// Builds a loader on the current runtime with a fixed CDN base and version.
pub fn loader(executor: &RecordingExecutor) -> Loader {
    Loader::builder(executor.clone())
        .with_config(
            LoaderConfig::new()
                .with_cdn_base_url("//cdn.example.com/")
                .with_version("3"),
        )
        .build()
        .expect("loader builds inside a runtime")
}

/// Canonical URL of `reference` under [`BASE`].
pub fn canonical(reference: &str) -> String {
    format!("{BASE}{reference}")
}

/// Ordered record of fired callbacks.
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a callback that appends `name` when fired.
    pub fn callback(&self, name: impl Into<String>) -> impl FnOnce() + Send + 'static {
        let entries = Arc::clone(&self.entries);
        let name = name.into();
        move || entries.lock().push(name)
    }

    pub fn push(&self, name: impl Into<String>) {
        self.entries.lock().push(name.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Waits until no request is pending, failing the test after five seconds.
pub async fn settle(loader: &Loader) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while loader.pending_requests() > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("loader settles");
}
