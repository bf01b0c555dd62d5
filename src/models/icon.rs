// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marker icon request and rendered icon asset.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// What the caller wants a marker to look like.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIconRequest {
    pub icon_url: Option<String>,
    pub icon_name: Option<String>,
    pub color: String,
}

impl MarkerIconRequest {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.icon_url = Some(url.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.icon_name = Some(name.into());
        self
    }

    /// Icon URL, treating an empty string as absent.
    pub fn url(&self) -> Option<&str> {
        self.icon_url.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Icon-set name, treating an empty string as absent.
    pub fn name(&self) -> Option<&str> {
        self.icon_name.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Where an icon's markup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SourceKind {
    /// Built-in pin shape, tinted.
    InlineFallback,
    /// Remote SVG fetched, recoloured and inlined.
    RemoteInlined,
    /// `<img>` pointing at the remote SVG, shown until inlining completes.
    RemoteHosted,
}

/// A renderable marker icon (the equivalent of a Leaflet `divIcon`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IconAsset {
    pub html: String,
    pub class_name: String,
    pub anchor_point: (i32, i32),
    pub size: (u32, u32),
    pub popup_anchor: (i32, i32),
    pub source_kind: SourceKind,
}
