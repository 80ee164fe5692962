//! The hosting page as seen by the loader.

use core::fmt;
use std::sync::Arc;

use beacon_loader::{LoaderBuilder, LoaderConfig};

use crate::cookie::CookieJar;
use crate::debug::resolve_debug;
use crate::page::PageLocation;

/// Page location plus cookie store.
#[derive(Clone)]
pub struct Environment {
    page: PageLocation,
    cookies: Arc<dyn CookieJar>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

impl Environment {
    /// Creates an environment.
    #[must_use]
    pub fn new(page: PageLocation, cookies: Arc<dyn CookieJar>) -> Self {
        Self { page, cookies }
    }

    /// Returns the page location.
    #[must_use]
    pub fn page(&self) -> &PageLocation {
        &self.page
    }

    /// Returns the cookie store.
    #[must_use]
    pub fn cookies(&self) -> &Arc<dyn CookieJar> {
        &self.cookies
    }

    /// Resolves debug mode, persisting any hash directive.
    #[must_use]
    pub fn debug(&self, config: &LoaderConfig) -> bool {
        resolve_debug(config, &self.page, &*self.cookies)
    }

    /// Applies the page scheme and the resolved debug mode to `builder`.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use beacon_env::{Environment, MemoryCookieJar, PageLocation};
    /// use beacon_loader::Loader;
    /// use beacon_loader::testing::RecordingExecutor;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let env = Environment::new(
    ///     PageLocation::parse("https://example.com/#echo.debug:true"),
    ///     Arc::new(MemoryCookieJar::new()),
    /// );
    /// let loader = env.apply(Loader::builder(RecordingExecutor::new())).build().unwrap();
    ///
    /// assert!(loader.is_debug());
    /// assert!(loader.get_url("//x/y").as_str().starts_with("https:"));
    /// # }
    /// ```
    #[must_use]
    pub fn apply(&self, builder: LoaderBuilder) -> LoaderBuilder {
        let debug = self.debug(builder.config());
        builder.with_scheme(self.page.scheme()).with_debug(debug)
    }
}
