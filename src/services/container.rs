// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The DOM container the streetmap mounts into.
//!
//! The host page renders an empty `<div>` whose data attributes carry the
//! engine's initial configuration: dataset endpoint, title, selected dataset
//! ids and tile layer template.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Openkaarten REST namespace appended to bare site URLs.
pub const REST_PATH: &str = "wp-json/owc/openkaarten/v1";

pub const CONTAINER_ID: &str = "owc-openkaarten-streetmap";

/// Block attributes as saved by the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockAttributes {
    #[serde(default)]
    pub rest_uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selected_datasets: Vec<String>,
    #[serde(default)]
    pub tile_layer_uri: Option<String>,
}

/// Value of one DOM attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Boolean attribute, rendered without a value.
    Flag,
    Text(String),
    /// Space-separated list; empty and duplicate items are dropped.
    List(Vec<String>),
}

/// Escape text for use inside a double-quoted HTML attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render attributes as `key="value"` pairs, without leading or trailing
/// whitespace.
pub fn to_dom_attributes(attributes: &[(&str, AttrValue)]) -> String {
    attributes
        .iter()
        .map(|(key, value)| match value {
            AttrValue::Flag => (*key).to_string(),
            AttrValue::Text(text) => format!(r#"{key}="{}""#, escape_attr(text)),
            AttrValue::List(items) => {
                let mut seen = BTreeSet::new();
                let joined = items
                    .iter()
                    .filter(|item| !item.is_empty() && seen.insert(item.as_str()))
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(r#"{key}="{}""#, escape_attr(&joined))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_http_url(candidate: &str) -> bool {
    reqwest::Url::parse(candidate).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Resolve the configured REST URI to the Openkaarten endpoint.
///
/// Empty or invalid input falls back to `site_rest_root`.
pub fn normalize_rest_uri(rest_uri: Option<&str>, site_rest_root: &str) -> String {
    let uri = rest_uri
        .map(str::trim)
        .filter(|uri| is_http_url(uri))
        .unwrap_or(site_rest_root);
    rest_endpoint(uri)
}

/// Append the Openkaarten REST path when `uri` names only a site or the
/// generic REST root.
pub fn rest_endpoint(uri: &str) -> String {
    if let Some(site) = uri
        .strip_suffix("/wp-json/")
        .or_else(|| uri.strip_suffix("/wp-json"))
    {
        return format!("{site}/{REST_PATH}");
    }

    if !uri.contains("wp-json/") {
        return format!("{}/{REST_PATH}", uri.trim_end_matches('/'));
    }

    uri.to_string()
}

/// Render the mount container for a block.
///
/// An empty tile layer attribute falls back to `default_tile_layer_uri`.
pub fn render_container(
    attributes: &BlockAttributes,
    site_rest_root: &str,
    default_tile_layer_uri: &str,
) -> String {
    let endpoint = normalize_rest_uri(attributes.rest_uri.as_deref(), site_rest_root);
    let tile_layer_uri = attributes
        .tile_layer_uri
        .as_deref()
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .unwrap_or(default_tile_layer_uri);
    let dataset_ids = serde_json::to_string(&attributes.selected_datasets).unwrap_or_default();

    let attrs = to_dom_attributes(&[
        ("id", AttrValue::Text(CONTAINER_ID.to_string())),
        ("class", AttrValue::List(vec![CONTAINER_ID.to_string()])),
        ("data-endpoint", AttrValue::Text(endpoint)),
        (
            "data-title",
            AttrValue::Text(attributes.title.clone().unwrap_or_default()),
        ),
        ("data-dataset-ids", AttrValue::Text(dataset_ids)),
        (
            "data-tile-layer-uri",
            AttrValue::Text(tile_layer_uri.to_string()),
        ),
    ]);

    format!("<div {attrs}></div>")
}

/// Configuration read back from the container's data attributes at mount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountConfig {
    pub endpoint: String,
    pub title: String,
    pub dataset_ids: Vec<String>,
    pub tile_layer_uri: String,
}

impl MountConfig {
    /// Build from `(attribute name, value)` pairs, e.g. an element's dataset.
    pub fn from_attributes<'a>(attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut config = Self::default();
        for (name, value) in attributes {
            match name {
                "data-endpoint" => config.endpoint = value.to_string(),
                "data-title" => config.title = value.to_string(),
                "data-dataset-ids" => {
                    config.dataset_ids = serde_json::from_str(value).unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "Ignoring malformed data-dataset-ids");
                        Vec::new()
                    })
                }
                "data-tile-layer-uri" => config.tile_layer_uri = value.to_string(),
                _ => {}
            }
        }
        config
    }
}

/// Content of the list-view toggle control.
pub fn list_view_button_html(title: &str, color: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" fill="none"><g clip-path="url(#a)" stroke="{}" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="M9 6h11M9 12h11M9 18h11M5 6v.01M5 12v.01M5 18v.01"/></g></svg><span class="leaflet-control-list-view__control-text">{}</span>"#,
        escape_attr(color),
        escape_attr(title)
    )
}
