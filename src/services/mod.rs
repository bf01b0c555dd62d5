// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - streetmap engine logic.

pub mod bounds;
pub mod cluster;
pub mod container;
pub mod datasets;
pub mod icon;
pub mod overlap;
pub mod proxy;
pub mod streetmap;
pub mod tooltip;

pub use bounds::{compute_bounds, compute_center};
pub use cluster::{cluster_diameter, cluster_icon, ClusterIcon, ClusterOptions};
pub use container::{render_container, BlockAttributes, MountConfig};
pub use datasets::{DatasetLoad, DatasetLoader, LoadError};
pub use icon::{HttpIconFetcher, IconFetcher, IconResolver, MarkerLease, Refinement};
pub use overlap::OverlapSelector;
pub use proxy::DatasetProxy;
pub use streetmap::Streetmap;
pub use tooltip::build_tooltip_card;
