// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Initial viewport computation.

use crate::models::{Bounds, Dataset, LatLng};

/// Bounds enclosing every coordinate of every feature of every dataset.
///
/// Leaves are read as `[longitude, latitude]`. Returns `None` when no leaf
/// coordinate exists (no datasets, no features, or no geometry).
pub fn compute_bounds(datasets: &[Dataset]) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;

    let leaves = datasets
        .iter()
        .flat_map(|dataset| dataset.features.iter())
        .filter_map(|feature| feature.geometry.as_ref())
        .flat_map(|geometry| geometry.coordinates.leaves());

    for position in leaves {
        match bounds.as_mut() {
            Some(b) => b.extend(position.lat, position.lon),
            None => bounds = Some(Bounds::from_point(position.lat, position.lon)),
        }
    }

    bounds
}

/// Midpoint of the bounds on each axis.
pub fn compute_center(bounds: &Bounds) -> LatLng {
    let center = bounds.to_rect().center();
    LatLng {
        lat: center.y,
        long: center.x,
    }
}
