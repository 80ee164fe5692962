//! Debug mode sourcing.
//!
//! A URL hash directive `<namespace><any char>debug:(true|false)`, found
//! anywhere in the hash, takes precedence and is persisted:
//!
//! | Hash | Debug | Cookie |
//! |------|-------|--------|
//! | `…debug:true` | on | set, path `/` |
//! | `…debug:false` | off | removed, path `/` |
//! | no directive | cookie present and non-empty | untouched |

use beacon_loader::LoaderConfig;
use regex::Regex;

use crate::cookie::{CookieJar, CookieOptions};
use crate::page::PageLocation;

/// Where the debug decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSource {
    /// A directive in the URL hash.
    Hash,
    /// The persisted debug cookie.
    Cookie,
}

/// Finds a debug directive in `hash`, returning its value.
///
/// The first directive wins.
///
/// ```
/// use beacon_env::parse_debug_directive;
///
/// assert_eq!(parse_debug_directive("#x&echo.debug:true", "echo"), Some(true));
/// assert_eq!(parse_debug_directive("#echo-debug:false", "echo"), Some(false));
/// assert_eq!(parse_debug_directive("#echodebug:true", "echo"), None);
/// ```
#[must_use]
pub fn parse_debug_directive(hash: &str, namespace: &str) -> Option<bool> {
    if namespace.is_empty() {
        return None;
    }

    let pattern = format!("{}.debug:(true|false)", regex::escape(namespace));
    let directive = match Regex::new(&pattern) {
        Ok(directive) => directive,
        Err(err) => {
            tracing::warn!(error = %err, namespace, "unusable debug namespace");
            return None;
        }
    };

    directive
        .captures(hash)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str() == "true")
}

/// Decides whether debug mode is on for `page`, persisting hash directives
/// into `jar`.
pub fn resolve_debug(config: &LoaderConfig, page: &PageLocation, jar: &dyn CookieJar) -> bool {
    let options = CookieOptions::root();

    let (enabled, source) = match parse_debug_directive(&page.hash, &config.debug_namespace) {
        Some(true) => {
            jar.set(&config.debug_cookie, "true", &options);
            (true, DebugSource::Hash)
        }
        Some(false) => {
            jar.remove(&config.debug_cookie, &options);
            (false, DebugSource::Hash)
        }
        None => (
            jar.get(&config.debug_cookie)
                .is_some_and(|value| !value.is_empty()),
            DebugSource::Cookie,
        ),
    };

    tracing::debug!(enabled, ?source, cookie = %config.debug_cookie, "debug mode resolved");
    enabled
}
