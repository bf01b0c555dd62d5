// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use futures_util::future::{BoxFuture, FutureExt};
use openkaarten_streetmap::config::Config;
use openkaarten_streetmap::models::Dataset;
use openkaarten_streetmap::routes::create_router;
use openkaarten_streetmap::services::icon::{IconError, IconFetcher};
use openkaarten_streetmap::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Create a test app with the test configuration.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default()));
    (create_router(state.clone()), state)
}

/// Serve `router` on an ephemeral local port, standing in for a remote
/// Openkaarten site. Returns the base URL without trailing slash.
#[allow(dead_code)]
pub async fn spawn_upstream(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind upstream");
    let addr = listener.local_addr().expect("Upstream address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}

/// Icon fetcher that counts calls and answers with fixed markup, or fails.
#[allow(dead_code)]
pub struct CountingFetcher {
    calls: AtomicUsize,
    svg: Option<String>,
    delay: Duration,
}

#[allow(dead_code)]
impl CountingFetcher {
    pub fn serving(svg: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            svg: Some(svg.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            svg: None,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IconFetcher for CountingFetcher {
    fn fetch_svg<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<String, IconError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.svg.clone().ok_or(IconError::Status(404))
        }
        .boxed()
    }
}

/// Raw text of a file under `tests/fixtures/`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path}: {e}"))
}

/// Datasets of the `datasets.json` fixture collection.
#[allow(dead_code)]
pub fn fixture_datasets() -> Vec<Dataset> {
    let body: serde_json::Value =
        serde_json::from_str(&fixture("datasets.json")).expect("Fixture is JSON");
    serde_json::from_value(body["datasets"].clone()).expect("Fixture datasets")
}
