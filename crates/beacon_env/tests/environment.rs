//! Environment inputs applied to a real loader.

use std::sync::Arc;

use beacon_env::{CookieJar, Environment, MemoryCookieJar, PageLocation, parse_debug_directive};
use beacon_loader::testing::RecordingExecutor;
use beacon_loader::{Loader, LoaderConfig, Scheme};

fn build(env: &Environment) -> Loader {
    env.apply(
        Loader::builder(RecordingExecutor::new()).with_config(
            LoaderConfig::new()
                .with_cdn_base_url("//cdn.example.com/")
                .with_version("3"),
        ),
    )
    .build()
    .unwrap()
}

#[tokio::test]
async fn debug_persists_across_page_loads() {
    let jar = Arc::new(MemoryCookieJar::new());

    let first = Environment::new(PageLocation::parse("http://site/#echo.debug:true"), jar.clone());
    assert!(build(&first).is_debug());
    assert_eq!(jar.get("echo-debug").as_deref(), Some("true"));

    // Next page load without the directive still runs in debug mode.
    let second = Environment::new(PageLocation::parse("http://site/other"), jar.clone());
    let loader = build(&second);
    assert!(loader.is_debug());
    assert_eq!(loader.get_url("a.js"), "http://cdn.example.com/sdk/v3/dev/a.js");

    let third = Environment::new(PageLocation::parse("http://site/#echo.debug:false"), jar.clone());
    assert!(!build(&third).is_debug());
    assert!(jar.is_empty());
}

#[tokio::test]
async fn secure_page_resolves_https() {
    let env = Environment::new(
        PageLocation::parse("https://site/"),
        Arc::new(MemoryCookieJar::new()),
    );
    let loader = build(&env);

    assert_eq!(loader.scheme(), Scheme::Https);
    assert_eq!(loader.get_url("//x/y"), "https://x/y");
    assert_eq!(loader.get_url("a.js"), "https://cdn.example.com/sdk/v3/a.js");
}

#[tokio::test]
async fn custom_namespace_and_cookie() {
    let jar = Arc::new(MemoryCookieJar::new());
    let env = Environment::new(PageLocation::parse("http://site/#beacon:debug:true"), jar.clone());

    let mut config = LoaderConfig::new();
    config.debug_namespace = "beacon".to_owned();
    config.debug_cookie = "beacon-debug".to_owned();
    assert!(env.debug(&config));
    assert_eq!(jar.get("beacon-debug").as_deref(), Some("true"));
    assert!(jar.get("echo-debug").is_none());
}

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A directive is found regardless of what surrounds it.
        #[test]
        fn prop_directive_found_anywhere(
            prefix in "[a-z&=]{0,12}",
            separator in "[.\\-_:/]",
            suffix in "[a-z&=]{0,12}",
            value in any::<bool>(),
        ) {
            let hash = format!("#{prefix}&echo{separator}debug:{value}{suffix}");
            prop_assert_eq!(parse_debug_directive(&hash, "echo"), Some(value));
        }

        /// Hashes without the word `debug:` never carry a directive.
        #[test]
        fn prop_no_directive_without_keyword(hash in "#[a-c&=.]{0,24}") {
            prop_assert_eq!(parse_debug_directive(&hash, "echo"), None);
        }
    }
}
