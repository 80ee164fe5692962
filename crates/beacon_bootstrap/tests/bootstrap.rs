//! Environment, canvas and application bootstrap against fake page hosts.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use beacon_bootstrap::{
    AppScripts, AppSpec, BootstrapError, InitMode, ScriptLocation, SharedTarget, attributes,
};
use beacon_loader::Scheme;
use beacon_viewport::ViewportEvent;
use common::{FakeElement, page};
use serde_json::json;

async fn settle(page: &common::Page) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while page.bootstrap.loader().pending_requests() > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("loader settles");
}

#[tokio::test]
async fn ready_environment_runs_callback_synchronously() {
    let page = page(Scheme::Http, false);
    page.host.define_base_runtime();
    let called = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&called);
    page.bootstrap
        .init_environment(move || flag.store(true, Ordering::SeqCst));

    assert!(called.load(Ordering::SeqCst));
    assert!(page.bootstrap.is_environment_ready());
    assert_eq!(page.bootstrap.loader().pending_requests(), 0);
    tokio::task::yield_now().await;
    assert!(page.executor.batches().is_empty());
}

#[tokio::test]
async fn missing_environment_is_downloaded_once() {
    let page = page(Scheme::Https, false);

    let first = Arc::new(AtomicBool::new(false));
    let second = Arc::new(AtomicBool::new(false));
    let (a, b) = (Arc::clone(&first), Arc::clone(&second));
    page.bootstrap.init_environment(move || a.store(true, Ordering::SeqCst));
    page.bootstrap.init_environment(move || b.store(true, Ordering::SeqCst));
    settle(&page).await;

    assert!(first.load(Ordering::SeqCst) && second.load(Ordering::SeqCst));
    assert_eq!(
        page.executor.batches(),
        vec![vec![
            "https://cdn.example.com/sdk/v3/backplane.js".to_owned(),
            "https://cdn.example.com/sdk/v3/third-party/jquery.pack.js".to_owned(),
            "https://cdn.example.com/sdk/v3/environment.pack.js".to_owned(),
        ]]
    );
    assert!(page.bootstrap.is_environment_ready());
}

#[tokio::test]
async fn partially_present_environment_downloads_the_rest() {
    let page = page(Scheme::Http, false);
    page.host.define("Backplane");

    page.bootstrap.load_environment().await;

    assert_eq!(page.executor.download_count("backplane.js"), 0);
    assert_eq!(page.executor.download_count("jquery.pack.js"), 1);
    assert_eq!(page.executor.download_count("environment.pack.js"), 1);
}

#[tokio::test]
async fn init_reads_page_canvases_and_overrides() {
    let page = page(Scheme::Http, false);
    page.host.add_canvas(FakeElement::new(
        &[
            (attributes::CANVAS_ID, "jskit/comments#left"),
            (attributes::REFRESH_ON_USER_INVALIDATE, "true"),
        ],
        0.0,
    ));
    page.host
        .add_canvas(FakeElement::new(&[(attributes::CANVAS_ID, "jskit/comments#right")], 0.0));
    page.bootstrap
        .set_override("jskit/comments#left", "stream", json!({"liveUpdates": false}));

    let watches = page.bootstrap.init(None);
    assert_eq!(watches.len(), 2);
    settle(&page).await;

    let created = page.factory.created();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].id.as_deref(), Some("jskit/comments#left"));
    assert!(created[0].refresh_on_user_invalidate);
    assert_eq!(created[0].overrides.get("stream"), Some(&json!({"liveUpdates": false})));
    assert_eq!(created[1].id.as_deref(), Some("jskit/comments#right"));
    assert!(!created[1].refresh_on_user_invalidate);
    assert!(created[1].overrides.is_empty());

    assert_eq!(page.executor.batches().len(), 1);
}

#[tokio::test]
async fn explicit_canvases_skip_page_lookup() {
    let page = page(Scheme::Http, false);
    page.host.define_base_runtime();
    page.host
        .add_canvas(FakeElement::new(&[(attributes::CANVAS_ID, "on-page")], 0.0));

    page.bootstrap
        .init(Some(vec![FakeElement::new(&[(attributes::CANVAS_ID, "explicit")], 0.0) as SharedTarget]));

    let created = page.factory.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].id.as_deref(), Some("explicit"));
}

#[tokio::test]
async fn init_within_scopes_lookup_to_container() {
    let page = page(Scheme::Http, false);
    page.host.define_base_runtime();
    page.host
        .add_canvas(FakeElement::new(&[(attributes::CANVAS_ID, "elsewhere")], 0.0));

    let sidebar = FakeElement::new(&[], 0.0);
    sidebar.add_child(FakeElement::new(&[(attributes::CANVAS_ID, "sidebar/poll")], 0.0));
    sidebar.add_child(FakeElement::new(&[(attributes::CANVAS_ID, "sidebar/chat")], 0.0));

    let watches = page.bootstrap.init_within(sidebar.as_ref());

    assert_eq!(watches.len(), 2);
    let ids: Vec<_> = page.factory.created().into_iter().filter_map(|data| data.id).collect();
    assert_eq!(ids, ["sidebar/poll", "sidebar/chat"]);
}

#[tokio::test(start_paused = true)]
async fn when_visible_canvas_waits_for_the_viewport() {
    let page = page(Scheme::Http, false);
    page.host.define_base_runtime();
    let element = FakeElement::new(
        &[(attributes::CANVAS_ID, "below-the-fold"), (attributes::INIT, "when-visible")],
        2000.0,
    );

    let watches = page.bootstrap.init(Some(vec![element.clone() as SharedTarget]));
    assert!(watches[0].is_pending());

    page.host.notify(ViewportEvent::Scroll);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(page.factory.count(), 0);

    element.scroll_to(300.0);
    page.host.notify(ViewportEvent::Scroll);
    tokio::time::sleep(Duration::from_millis(49)).await;
    assert_eq!(page.factory.count(), 0);
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(page.factory.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn when_visible_canvas_in_view_starts_immediately() {
    let page = page(Scheme::Http, false);
    page.host.define_base_runtime();
    let element = FakeElement::new(&[(attributes::INIT, "when-visible")], 100.0);

    let watches = page.bootstrap.init(Some(vec![element as SharedTarget]));

    assert!(!watches[0].is_pending());
    assert_eq!(page.factory.count(), 1);
}

#[tokio::test]
async fn init_application_selects_script_for_page() {
    let page = page(Scheme::Https, true);
    page.host.define_base_runtime();

    let app = AppSpec::new("Echo.StreamServer.Controls.Stream")
        .with_script("fallback.js")
        .with_scripts(AppScripts {
            prod: Some(ScriptLocation::Url("stream.pack.js".into())),
            dev: Some(ScriptLocation::Split {
                regular: Some("http-dev.js".into()),
                secure: Some("https-dev.js".into()),
            }),
        })
        .with_config(json!({"useSecureAPI": true}));

    let watch = page
        .bootstrap
        .init_application(app, FakeElement::new(&[], 0.0))
        .unwrap();
    assert!(!watch.is_pending());

    let created = page.factory.created();
    assert_eq!(created.len(), 1);
    assert!(created[0].use_secure_api);
    assert_eq!(created[0].apps[0].script.as_deref(), Some("https-dev.js"));
    assert!(created[0].apps[0].scripts.is_none());
}

#[tokio::test(start_paused = true)]
async fn init_application_honors_when_visible() {
    let page = page(Scheme::Http, false);
    page.host.define_base_runtime();
    let element = FakeElement::new(&[], 900.0);

    let watch = page
        .bootstrap
        .init_application(
            AppSpec::new("Counter").with_init(InitMode::WhenVisible),
            element.clone(),
        )
        .unwrap();
    assert!(watch.is_pending());

    element.scroll_to(0.0);
    page.host.notify(ViewportEvent::Resize);
    watch.finished().await;
    assert_eq!(page.factory.count(), 1);
}

#[tokio::test]
async fn init_application_rejects_missing_component() {
    let page = page(Scheme::Http, false);
    let err = page
        .bootstrap
        .init_application(AppSpec::default(), FakeElement::new(&[], 0.0))
        .unwrap_err();
    assert!(matches!(err, BootstrapError::MissingComponent));
    assert_eq!(page.factory.count(), 0);
}
