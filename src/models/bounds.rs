// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Viewport bounds and map positions.

use geo::{coord, Rect};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A map position. Serialized as `{lat, long}` to match the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LatLng {
    pub lat: f64,
    pub long: f64,
}

impl LatLng {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }
}

/// Rectangular lat/long extent. Only ever constructed fully populated;
/// "no coordinates" is expressed as `Option<Bounds>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_long: f64,
    pub max_long: f64,
}

impl Bounds {
    /// Degenerate bounds around a single position.
    pub fn from_point(lat: f64, long: f64) -> Self {
        Self {
            min_lat: lat,
            max_lat: lat,
            min_long: long,
            max_long: long,
        }
    }

    /// Grow to include a position.
    pub fn extend(&mut self, lat: f64, long: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
        self.min_long = self.min_long.min(long);
        self.max_long = self.max_long.max(long);
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: LatLng) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_long..=self.max_long).contains(&point.long)
    }

    /// As a `geo` rectangle in (x = longitude, y = latitude) space.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_long, y: self.min_lat },
            coord! { x: self.max_long, y: self.max_lat },
        )
    }

    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_long: rect.min().x,
            max_long: rect.max().x,
        }
    }
}
