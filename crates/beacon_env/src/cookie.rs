//! Cookie jar abstraction.
//!
//! Debug mode persists across page loads through a cookie. The platform
//! cookie store sits behind [`CookieJar`]; [`MemoryCookieJar`] is the
//! in-process implementation used by hosts without one and by tests.

use hashbrown::HashMap;
use parking_lot::Mutex;

/// Attributes applied when writing or removing a cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    /// Cookie path.
    pub path: String,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self::root()
    }
}

impl CookieOptions {
    /// Options scoped to the whole site (`path=/`).
    #[must_use]
    pub fn root() -> Self {
        Self {
            path: "/".to_owned(),
        }
    }

    /// Sets the cookie path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// Platform cookie store.
pub trait CookieJar: Send + Sync {
    /// Returns the value of `name`, if set.
    fn get(&self, name: &str) -> Option<String>;

    /// Sets `name` to `value`.
    fn set(&self, name: &str, value: &str, options: &CookieOptions);

    /// Removes `name`.
    fn remove(&self, name: &str, options: &CookieOptions);
}

/// In-memory [`CookieJar`].
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, (String, CookieOptions)>>,
}

impl MemoryCookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `name=value; name2=value2` cookie header.
    ///
    /// Pairs without `=` are skipped. Later duplicates win.
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let jar = Self::new();
        for (name, value) in header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.trim(), value.trim()))
            .filter(|(name, _)| !name.is_empty())
        {
            jar.set(name, value, &CookieOptions::root());
        }
        jar
    }

    /// Renders the jar as a cookie header, sorted by name.
    #[must_use]
    pub fn header(&self) -> String {
        let cookies = self.cookies.lock();
        let mut pairs: Vec<_> = cookies
            .iter()
            .map(|(name, (value, _))| format!("{name}={value}"))
            .collect();
        pairs.sort();
        pairs.join("; ")
    }

    /// Returns the options `name` was last written with.
    #[must_use]
    pub fn options(&self, name: &str) -> Option<CookieOptions> {
        self.cookies.lock().get(name).map(|(_, options)| options.clone())
    }

    /// Returns the number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.lock().len()
    }

    /// Returns whether the jar is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.lock().is_empty()
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.lock().get(name).map(|(value, _)| value.clone())
    }

    fn set(&self, name: &str, value: &str, options: &CookieOptions) {
        self.cookies
            .lock()
            .insert(name.to_owned(), (value.to_owned(), options.clone()));
    }

    fn remove(&self, name: &str, _options: &CookieOptions) {
        self.cookies.lock().remove(name);
    }
}
