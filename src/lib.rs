// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Openkaarten streetmap: geometry and interaction engine for Openkaarten
//! dataset maps.
//!
//! This crate provides the map engine (bounds, marker icons, clustering,
//! overlapping-polygon selection, tooltip cards, dataset loading) and the
//! small HTTP service around it (dataset proxy, block container renderer).

pub mod config;
pub mod error;
pub mod map;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::DatasetProxy;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub proxy: DatasetProxy,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let proxy = DatasetProxy::new(config.upstream_timeout);
        Self { config, proxy }
    }
}
