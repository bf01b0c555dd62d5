// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::services::cluster::ClusterOptions;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MARKER_COLOR: &str = "#ff0000";
const DEFAULT_TILE_LAYER_URI: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Origin allowed by CORS besides localhost
    pub frontend_url: String,
    /// Full URL of `POST /proxy-datasets` used by the dataset loader.
    /// When set, every dataset request goes through it.
    pub proxy_url: Option<String>,
    /// Base URL of the shared icon set for named marker icons
    pub icon_base_url: Option<String>,
    pub default_marker_color: String,
    pub tile_layer_uri: String,
    /// REST root of the host site, used when a block has no valid REST URI
    pub site_rest_root: String,
    /// Timeout for every outbound request (datasets, proxy, icons)
    pub upstream_timeout: Duration,
    pub cluster: ClusterOptions,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = ClusterOptions::default();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            proxy_url: optional("PROXY_URL"),
            icon_base_url: optional("ICON_BASE_URL"),
            default_marker_color: optional("DEFAULT_MARKER_COLOR")
                .unwrap_or_else(|| DEFAULT_MARKER_COLOR.to_string()),
            tile_layer_uri: optional("TILE_LAYER_URI")
                .unwrap_or_else(|| DEFAULT_TILE_LAYER_URI.to_string()),
            site_rest_root: optional("SITE_REST_ROOT")
                .ok_or(ConfigError::Missing("SITE_REST_ROOT"))?,
            upstream_timeout: Duration::from_secs(parsed("UPSTREAM_TIMEOUT_SECS", 10)?),
            cluster: ClusterOptions {
                disable_clustering_at_zoom: parsed(
                    "CLUSTER_DISABLE_AT_ZOOM",
                    defaults.disable_clustering_at_zoom,
                )?,
                max_cluster_radius: parsed("CLUSTER_MAX_RADIUS", defaults.max_cluster_radius)?,
                show_coverage_on_hover: parsed(
                    "CLUSTER_COVERAGE_ON_HOVER",
                    defaults.show_coverage_on_hover,
                )?,
                size_multiplier: parsed("CLUSTER_SIZE_MULTIPLIER", defaults.size_multiplier)?,
            },
        })
    }

    /// Config for tests: no proxy, no icon set, short timeout.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            proxy_url: None,
            icon_base_url: None,
            default_marker_color: DEFAULT_MARKER_COLOR.to_string(),
            tile_layer_uri: DEFAULT_TILE_LAYER_URI.to_string(),
            site_rest_root: "https://host.example/wp-json/".to_string(),
            upstream_timeout: Duration::from_secs(5),
            cluster: ClusterOptions::default(),
        }
    }
}

/// Non-empty, trimmed value of an environment variable.
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
