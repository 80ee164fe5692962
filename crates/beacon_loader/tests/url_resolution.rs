//! Canonical URL resolution through the loader facade.

mod common;

use beacon_loader::testing::RecordingExecutor;
use beacon_loader::{Loader, LoaderConfig, Scheme};
use common::loader;

fn loader_with(scheme: Scheme, debug: bool) -> Loader {
    Loader::builder(RecordingExecutor::new())
        .with_config(
            LoaderConfig::new()
                .with_cdn_base_url("//cdn.example.com/")
                .with_version("3.0.12"),
        )
        .with_scheme(scheme)
        .with_debug(debug)
        .build()
        .unwrap()
}

#[tokio::test]
async fn https_page_with_debug() {
    let loader = loader_with(Scheme::Https, true);
    assert_eq!(loader.get_url("//x/y"), "https://x/y");
    assert_eq!(loader.get_url("http://x/y"), "http://x/y");
    assert_eq!(
        loader.get_url("web/image.png"),
        "https://cdn.example.com/sdk/v3.0.12/dev/web/image.png"
    );
    assert_eq!(
        loader.get_url_with("web/image.png", false),
        "https://cdn.example.com/sdk/v3.0.12/web/image.png"
    );
}

#[tokio::test]
async fn page_protocol_selects_scheme() {
    let executor = RecordingExecutor::new();
    for (protocol, expected) in [("https:", Scheme::Https), ("http:", Scheme::Http), ("file:", Scheme::Http)] {
        let loader = Loader::builder(executor.clone())
            .with_page_protocol(protocol)
            .build()
            .unwrap();
        assert_eq!(loader.scheme(), expected, "{protocol}");
    }
}

#[tokio::test]
async fn set_debug_affects_only_later_resolutions() {
    let executor = RecordingExecutor::new();
    let loader = loader(&executor);
    assert!(!loader.is_debug());

    let before = loader.get_url("a.js");
    loader.set_debug(true);
    assert!(loader.is_debug());
    let after = loader.get_url("a.js");

    assert_eq!(before, "http://cdn.example.com/sdk/v3/a.js");
    assert_eq!(after, "http://cdn.example.com/sdk/v3/dev/a.js");
}

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_reference() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,8}(/[a-z]{1,8}){0,2}\\.(js|css|png)",
            "/[a-z]{1,8}\\.(js|css)",
            "//[a-z]{1,8}\\.com/[a-z]{1,8}\\.js",
            "https?://[a-z]{1,8}\\.com/[a-z]{1,8}\\.js",
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// Resolution is deterministic and always yields an absolute URL.
        #[test]
        fn prop_resolution_is_absolute_and_stable(
            reference in arb_reference(),
            secure in any::<bool>(),
            debug in any::<bool>(),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("tokio runtime");
            let _guard = rt.enter();
            let scheme = if secure { Scheme::Https } else { Scheme::Http };
            let loader = loader_with(scheme, debug);

            let url = loader.get_url(&reference);
            prop_assert_eq!(&url, &loader.get_url(&reference));
            prop_assert!(url.as_str().starts_with("http://") || url.as_str().starts_with("https://"));
            prop_assert!(!url.as_str().contains("//sdk"));
        }

        /// Leading slashes on relative references never change the result.
        #[test]
        fn prop_leading_slash_is_ignored(name in "[a-z]{1,8}/[a-z]{1,8}\\.js", debug in any::<bool>()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("tokio runtime");
            let _guard = rt.enter();
            let loader = loader_with(Scheme::Http, debug);

            prop_assert_eq!(loader.get_url(&name), loader.get_url(&format!("/{name}")));
        }

        /// Absolute references pass through untouched.
        #[test]
        fn prop_absolute_reference_unchanged(
            reference in "https?://[a-z]{1,8}\\.com/[a-z]{1,8}\\.js",
            debug in any::<bool>(),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("tokio runtime");
            let _guard = rt.enter();
            let loader = loader_with(Scheme::Https, debug);

            let resolved = loader.get_url(&reference);
            prop_assert_eq!(resolved.as_str(), reference.as_str());
        }
    }
}
