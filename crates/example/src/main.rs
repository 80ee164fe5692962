//! Beacon loader demo.
//!
//! Simulates a page with three canvases, one of them below the fold, and
//! shows overlapping downloads being deduplicated and serialized.
//!
//! # Usage
//!
//! ```bash
//! beacon-demo [page_href] [loader_config.json]
//! ```
//!
//! # Example
//!
//! ```bash
//! BEACON_LOG=beacon_loader=debug beacon-demo "https://news.example.com/#echo.debug:true"
//! ```

use std::sync::Arc;
use std::time::Duration;

use beacon_bootstrap::{AppSpec, Bootstrap, attributes};
use beacon_core::{TracingFormat, TracingSetup};
use beacon_env::{Environment, MemoryCookieJar, PageLocation};
use beacon_loader::{Loader, LoaderConfig};
use beacon_viewport::Viewport;
use example::{LoggingFactory, SimulatedCanvas, SimulatedExecutor, SimulatedPage};

#[tokio::main]
async fn main() {
    let subscriber = TracingSetup::new()
        .with_format(TracingFormat::Compact)
        .from_env()
        .init();
    tracing::debug!(filter = %subscriber.filter, installed = subscriber.installed, "tracing ready");

    let args: Vec<String> = std::env::args().collect();
    let href = args
        .get(1)
        .map_or("https://news.example.com/", String::as_str);

    let config = match args.get(2) {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| LoaderConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: cannot load config {path}: {e}");
                std::process::exit(1);
            }
        },
        None => LoaderConfig::default(),
    };

    let page = SimulatedPage::new(
        vec![
            SimulatedCanvas::new(&[(attributes::CANVAS_ID, "news/comments#top")], 120.0),
            SimulatedCanvas::new(&[(attributes::CANVAS_ID, "news/comments#sidebar")], 300.0),
            SimulatedCanvas::new(
                &[
                    (attributes::CANVAS_ID, "news/poll"),
                    (attributes::INIT, "when-visible"),
                ],
                1800.0,
            ),
        ],
        Viewport::new(900.0, 0.0),
    );

    let executor = SimulatedExecutor::new(Arc::clone(&page), Duration::from_millis(150))
        .defines("backplane.js", "Backplane")
        .defines("jquery.pack.js", "Echo.jQuery")
        .defines("environment.pack.js", "Echo.Utils");

    let environment = Environment::new(PageLocation::parse(href), Arc::new(MemoryCookieJar::new()));
    let loader = match environment
        .apply(Loader::builder(executor).with_config(config))
        .build()
    {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(debug = loader.is_debug(), scheme = %loader.scheme(), "loader ready");

    let factory = LoggingFactory::new();
    let bootstrap = Bootstrap::builder(loader.clone(), page.clone(), factory.clone()).build();
    bootstrap.set_override("news/comments#top", "stream", serde_json::json!({"liveUpdates": false}));

    let watches = bootstrap.init(None);

    // An application script requested twice while the environment loads.
    let app = AppSpec::new("Echo.Apps.Counter").with_script("apps/counter.js");
    for _ in 0..2 {
        loader.download([app.script.clone().unwrap_or_default()], || {
            tracing::info!("counter script ready");
        });
    }

    loader.load(["apps/counter.js"]).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    page.scroll(1200.0);

    for watch in watches {
        watch.finished().await;
    }

    tracing::info!(
        canvases = ?factory.created(),
        pending = loader.pending_requests(),
        "demo finished"
    );
}
