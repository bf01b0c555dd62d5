// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end streetmap interaction on the headless map.

use axum::{routing::get, Router};
use common::CountingFetcher;
use openkaarten_streetmap::config::Config;
use openkaarten_streetmap::map::{HeadlessMap, LayerKind, MarkerState};
use openkaarten_streetmap::models::{Dataset, LatLng, SourceKind};
use openkaarten_streetmap::services::ClusterOptions;
use openkaarten_streetmap::services::{IconResolver, Streetmap};
use std::sync::Arc;
use std::time::Duration;

mod common;

const BIN_SVG: &str = r#"<svg viewBox="0 0 24 24"><path d="M0 0h24v24H0z"/></svg>"#;

fn streetmap(fetcher: Arc<CountingFetcher>) -> Streetmap<HeadlessMap> {
    let resolver = Arc::new(IconResolver::new(fetcher, None));
    Streetmap::new(HeadlessMap::new(), resolver, "#ff0000")
}

#[tokio::test]
async fn test_mount_renders_fixture() {
    let fetcher = Arc::new(CountingFetcher::serving(BIN_SVG));
    let mut sm = streetmap(fetcher.clone());

    let bounds = sm.mount(common::fixture_datasets()).expect("bounds");

    let map = sm.map();
    assert_eq!(map.viewport(), Some(bounds));
    assert_eq!(map.layers_of(LayerKind::Marker).len(), 2);
    assert_eq!(map.layers_of(LayerKind::Polygon).len(), 2);
    assert_eq!(map.layers_of(LayerKind::Line).len(), 1);

    let marker = map.layers_of(LayerKind::Marker)[0];
    assert_eq!(map.marker_position(marker), Some(LatLng::new(52.0907, 5.1214)));
    assert_eq!(
        map.marker_icon(marker).map(|icon| icon.source_kind),
        Some(SourceKind::RemoteHosted)
    );
}

#[tokio::test]
async fn test_icons_are_inlined_after_settle() {
    let fetcher = Arc::new(CountingFetcher::serving(BIN_SVG).with_delay(Duration::from_millis(10)));
    let mut sm = streetmap(fetcher.clone());
    sm.mount(common::fixture_datasets());

    assert_eq!(sm.settle().await, 2);

    for marker in sm.map().layers_of(LayerKind::Marker) {
        let icon = sm.map().marker_icon(marker).unwrap();
        assert_eq!(icon.source_kind, SourceKind::RemoteInlined);
        // Dataset marker colour, injected into the path.
        assert!(icon.html.contains(r##"<path fill="#2e7d32""##));
    }
    // Both markers share one (file, colour) key.
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_unmount_before_icons_arrive() {
    let fetcher = Arc::new(CountingFetcher::serving(BIN_SVG).with_delay(Duration::from_millis(20)));
    let mut sm = streetmap(fetcher);
    sm.mount(common::fixture_datasets());

    sm.unmount();

    assert_eq!(sm.settle().await, 0);
    assert!(sm.map().is_empty());
}

#[tokio::test]
async fn test_failed_icon_keeps_placeholder() {
    let mut sm = streetmap(Arc::new(CountingFetcher::failing()));
    sm.mount(common::fixture_datasets());

    assert_eq!(sm.settle().await, 0);
    let marker = sm.map().layers_of(LayerKind::Marker)[0];
    assert_eq!(
        sm.map().marker_icon(marker).map(|icon| icon.source_kind),
        Some(SourceKind::RemoteHosted)
    );
}

#[tokio::test]
async fn test_overlapping_zones_cycle() {
    let mut sm = streetmap(Arc::new(CountingFetcher::failing()));
    sm.mount(common::fixture_datasets());
    let inside_both = LatLng::new(52.09, 5.13);

    let first = sm.click_map(inside_both).expect("zone card");
    let second = sm.click_map(inside_both).expect("zone card");
    let third = sm.click_map(inside_both).expect("zone card");

    assert_eq!(first.location_title, "Zone B");
    assert_eq!(second.location_title, "Zone A");
    assert_eq!(third.location_title, "Zone B");
    assert_eq!(sm.map().layers_of(LayerKind::Highlight).len(), 1);

    assert!(sm.click_map(LatLng::new(0.0, 0.0)).is_none());
    assert!(sm.map().layers_of(LayerKind::Highlight).is_empty());
}

#[tokio::test]
async fn test_marker_click_dims_others() {
    let mut sm = streetmap(Arc::new(CountingFetcher::failing()));
    sm.mount(common::fixture_datasets());
    let markers = sm.map().layers_of(LayerKind::Marker);

    let card = sm.click_marker(markers[1]).expect("marker card");
    assert_eq!(card.dataset_id, "102");
    assert_eq!(sm.active_marker(), Some(markers[1]));
    assert_eq!(sm.map().marker_state(markers[0]), Some(MarkerState::Dimmed));
    assert_eq!(sm.map().marker_state(markers[1]), Some(MarkerState::Active));

    // Polygons are not markers.
    let zone = sm.map().layers_of(LayerKind::Polygon)[0];
    assert!(sm.click_marker(zone).is_none());
}

#[tokio::test]
async fn test_remounts_do_not_accumulate_finished_refinements() {
    // A failing fetch never fills the cache, so every mount spawns again.
    let mut sm = streetmap(Arc::new(CountingFetcher::failing()));

    for _ in 0..5 {
        sm.mount(common::fixture_datasets());
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // Only the last mount's two markers are still tracked.
    assert_eq!(sm.pending_refinements(), 2);
    assert_eq!(sm.settle().await, 0);
    assert_eq!(sm.pending_refinements(), 0);
}

#[tokio::test]
async fn test_streetmap_from_config() {
    let upstream = Router::new().route("/icons/bank.svg", get(|| async { BIN_SVG }));
    let base = common::spawn_upstream(upstream).await;
    let config = Config {
        icon_base_url: Some(format!("{base}/icons")),
        default_marker_color: "#123456".to_string(),
        cluster: ClusterOptions {
            size_multiplier: 10.0,
            ..ClusterOptions::default()
        },
        ..Config::test_default()
    };

    let datasets: Vec<Dataset> = serde_json::from_value(serde_json::json!([{
        "id": 5,
        "title": "Bankjes",
        "features": [
            {"id": "named", "geometry": {"type": "Point", "coordinates": [5.1, 52.1]},
             "properties": {"marker": {"icon_name": "bank"}}},
            {"id": "plain", "geometry": {"type": "Point", "coordinates": [5.2, 52.2]}}
        ]
    }]))
    .unwrap();

    let mut sm = Streetmap::from_config(HeadlessMap::new(), &config);
    sm.mount(datasets);
    assert_eq!(sm.settle().await, 1);

    let markers = sm.map().layers_of(LayerKind::Marker);
    let named = sm.map().marker_icon(markers[0]).unwrap();
    assert_eq!(named.source_kind, SourceKind::RemoteInlined);
    assert!(named.html.contains(r##"fill="#123456""##));

    let plain = sm.map().marker_icon(markers[1]).unwrap();
    assert_eq!(plain.source_kind, SourceKind::InlineFallback);
    assert!(plain.html.contains("#123456"));

    assert_eq!(sm.cluster_options().size_multiplier, 10.0);
    assert_eq!(sm.cluster_icon(10, "green").size, (100.0, 100.0));
}
