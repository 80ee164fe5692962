//! Canonical URL resolution.
//!
//! [`UrlResolver`] maps a logical resource reference to the single absolute
//! URL used as the deduplication key:
//!
//! | Reference | Result |
//! |-----------|--------|
//! | `//host/path` | page scheme + reference |
//! | `http://…`, `https://…` | unchanged |
//! | anything else | `<cdn base>sdk/v<version>[/dev]/<reference>` |
//!
//! The `/dev` segment is only inserted when the caller asks for the
//! development variant *and* the shared [`DebugFlag`] is on. Resolution is a
//! pure function of its inputs and never fails.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::LoaderConfig;
use crate::debug::DebugFlag;

// ─────────────────────────────────────────────────────────────────────────────
// Scheme
// ─────────────────────────────────────────────────────────────────────────────

/// Scheme of the hosting page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain `http:`. Also the fallback for non-web protocols such as `file:`.
    #[default]
    Http,
    /// Secure `https:`.
    Https,
}

impl Scheme {
    /// Maps a page protocol (`"https:"`, `"http:"`, `"file:"`, …) to a scheme.
    ///
    /// Anything that is not `https` falls back to [`Scheme::Http`].
    #[must_use]
    pub fn from_page_protocol(protocol: &str) -> Self {
        let protocol = protocol.trim_end_matches(':');
        if protocol.eq_ignore_ascii_case("https") {
            Self::Https
        } else {
            Self::Http
        }
    }

    /// Returns the protocol prefix including the trailing colon.
    #[must_use]
    pub const fn as_protocol(self) -> &'static str {
        match self {
            Self::Http => "http:",
            Self::Https => "https:",
        }
    }

    /// Returns whether this is the secure scheme.
    #[must_use]
    pub const fn is_secure(self) -> bool {
        matches!(self, Self::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_protocol())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CanonicalUrl
// ─────────────────────────────────────────────────────────────────────────────

/// Fully resolved absolute URL, the key resources are deduplicated by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the URL, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::borrow::Borrow<str> for CanonicalUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CanonicalUrl {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonicalUrl {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UrlResolver
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves logical references to [`CanonicalUrl`]s.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    scheme: Scheme,
    /// CDN base, always absolute and ending with `/`.
    base_url: String,
    version: String,
    debug: DebugFlag,
}

impl UrlResolver {
    /// Creates a resolver for a page served over `scheme`.
    #[must_use]
    pub fn new(scheme: Scheme, config: &LoaderConfig, debug: DebugFlag) -> Self {
        let mut base_url = if is_protocol_relative(&config.cdn_base_url) {
            format!("{}{}", scheme.as_protocol(), config.cdn_base_url)
        } else {
            config.cdn_base_url.clone()
        };
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            scheme,
            base_url,
            version: config.version.clone(),
            debug,
        }
    }

    /// Returns the page scheme used for protocol-relative references.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Returns the absolute CDN base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns whether the shared debug flag is on.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug.get()
    }

    /// Resolves `reference` to its canonical URL.
    ///
    /// `dev_variant` requests the development build; it has no effect unless
    /// debug mode is on. Pass `false` for assets without a dev build (images).
    #[must_use]
    pub fn resolve(&self, reference: &str, dev_variant: bool) -> CanonicalUrl {
        if is_protocol_relative(reference) {
            return CanonicalUrl::new(format!("{}{reference}", self.scheme.as_protocol()));
        }
        if is_absolute(reference) {
            return CanonicalUrl::new(reference);
        }

        let mut url = String::with_capacity(
            self.base_url.len() + self.version.len() + reference.len() + 11,
        );
        url.push_str(&self.base_url);
        url.push_str("sdk/v");
        url.push_str(&self.version);
        if dev_variant && self.debug.get() {
            url.push_str("/dev");
        }
        if !reference.is_empty() && !reference.starts_with('/') {
            url.push('/');
        }
        url.push_str(reference);
        CanonicalUrl::new(url)
    }
}

fn is_protocol_relative(reference: &str) -> bool {
    reference.starts_with("//")
}

fn is_absolute(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}
