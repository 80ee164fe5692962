//! Page location.

use beacon_loader::Scheme;
use url::Url;

/// The parts of the hosting page's location the loader cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLocation {
    /// Protocol including the trailing colon, e.g. `"https:"`. May be empty.
    pub protocol: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
}

impl PageLocation {
    /// Creates a location from its parts.
    #[must_use]
    pub fn new(protocol: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            hash: hash.into(),
        }
    }

    /// Splits an href into protocol and hash.
    ///
    /// Never fails: an href that is not an absolute URL yields an empty
    /// protocol, which maps to [`Scheme::Http`], and keeps whatever follows
    /// its first `#` as the hash.
    #[must_use]
    pub fn parse(href: &str) -> Self {
        match Url::parse(href) {
            Ok(url) => Self {
                protocol: format!("{}:", url.scheme()),
                hash: url
                    .fragment()
                    .filter(|fragment| !fragment.is_empty())
                    .map(|fragment| format!("#{fragment}"))
                    .unwrap_or_default(),
            },
            Err(err) => {
                tracing::trace!(error = %err, href, "page href is not an absolute URL");
                let hash = href
                    .split_once('#')
                    .filter(|(_, fragment)| !fragment.is_empty())
                    .map(|(_, fragment)| format!("#{fragment}"))
                    .unwrap_or_default();
                Self {
                    protocol: String::new(),
                    hash,
                }
            }
        }
    }

    /// Returns the scheme used for protocol-relative URLs.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        Scheme::from_page_protocol(&self.protocol)
    }

    /// Returns whether the page was served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.scheme().is_secure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_protocol_and_hash() {
        let page = PageLocation::parse("HTTPS://example.com/a?b=c#echo.debug:true");
        assert_eq!(page.protocol, "https:");
        assert_eq!(page.hash, "#echo.debug:true");
        assert!(page.is_secure());
    }

    #[test]
    fn parse_without_hash_or_scheme() {
        let page = PageLocation::parse("example.com/path");
        assert_eq!(page.protocol, "");
        assert_eq!(page.hash, "");
        assert_eq!(page.scheme(), Scheme::Http);
    }

    #[test]
    fn file_pages_use_http() {
        let page = PageLocation::parse("file:///tmp/index.html");
        assert_eq!(page.protocol, "file:");
        assert_eq!(page.scheme(), Scheme::Http);
        assert!(!page.is_secure());
    }

    #[test]
    fn relative_href_keeps_its_hash() {
        let page = PageLocation::parse("/article#echo.debug:true");
        assert_eq!(page.protocol, "");
        assert_eq!(page.hash, "#echo.debug:true");
    }

    #[test]
    fn empty_fragment_is_no_hash() {
        assert_eq!(PageLocation::parse("https://example.com/#").hash, "");
    }
}
