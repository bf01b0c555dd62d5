// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for datasets, geometry and the rendered map surface.

pub mod bounds;
pub mod dataset;
mod de;
pub mod geometry;
pub mod icon;
pub mod proxy;
pub mod tooltip;

pub use bounds::{Bounds, LatLng};
pub use dataset::{Dataset, Feature, FeatureProperties, MarkerStyle, TooltipEntries, TooltipEntry};
pub use geometry::{Coordinate, Geometry, Position};
pub use icon::{IconAsset, MarkerIconRequest, SourceKind};
pub use proxy::{ProxyErrorEnvelope, ProxyRequest};
pub use tooltip::TooltipCard;
