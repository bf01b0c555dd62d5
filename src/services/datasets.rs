// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dataset fetching for the streetmap.
//!
//! Handles:
//! - URL validation before any network call
//! - Credential stripping (credentials only ever travel to the proxy)
//! - Double-encoded JSON bodies
//! - `DatasetCollection` shape validation

use crate::config::Config;
use crate::models::{Dataset, ProxyErrorEnvelope, ProxyRequest};
use crate::services::container::rest_endpoint;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

const COLLECTION_TYPE: &str = "DatasetCollection";

/// Why a load produced no datasets. Every variant is shown to the user as an
/// inline message; none aborts the host page.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL contains credentials but no dataset proxy is configured")]
    ProxyRequired,

    #[error("Fetching datasets failed: {0}")]
    Network(String),

    #[error("Fetching datasets failed: HTTP {status}: {detail}")]
    Upstream { status: u16, detail: String },

    #[error("Error parsing nested JSON: {0}")]
    NestedJson(String),

    #[error("Unexpected response format or 'datasets' is not an array")]
    UnexpectedShape,
}

impl LoadError {
    /// Input problems, as opposed to problems reaching or reading upstream.
    pub fn is_validation(&self) -> bool {
        matches!(self, LoadError::InvalidUrl(_) | LoadError::ProxyRequired)
    }
}

/// Result of a load: always a (possibly empty) dataset list, plus the error
/// to surface when something went wrong.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetLoad {
    pub datasets: Vec<Dataset>,
    pub error: Option<LoadError>,
}

impl DatasetLoad {
    /// Keep only datasets whose id is listed. An empty list keeps all.
    pub fn select(mut self, ids: &[String]) -> Self {
        if !ids.is_empty() {
            self.datasets.retain(|dataset| ids.contains(&dataset.id));
        }
        self
    }
}

/// Target of a dataset request, with credentials split off the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetTarget {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl DatasetTarget {
    /// Validate `rest_uri` and derive the datasets URL from it.
    pub fn parse(rest_uri: &str) -> Result<Self, LoadError> {
        let invalid = || LoadError::InvalidUrl(rest_uri.to_string());

        let mut url = Url::parse(rest_uri.trim()).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(invalid());
        }

        let username = decode_userinfo(url.username());
        let password = url.password().map(decode_userinfo).unwrap_or_default();
        url.set_username("").map_err(|_| invalid())?;
        url.set_password(None).map_err(|_| invalid())?;
        url.set_fragment(None);

        Ok(Self {
            url: datasets_url(url.as_str()).ok_or_else(invalid)?,
            username,
            password,
        })
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() || !self.password.is_empty()
    }
}

fn decode_userinfo(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// `…/wp-json/owc/openkaarten/v1/datasets?_locale=default` for a REST URI.
fn datasets_url(stripped: &str) -> Option<String> {
    let (base, query) = match stripped.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (stripped, None),
    };
    let endpoint = rest_endpoint(base);
    let endpoint = endpoint.trim_end_matches('/');
    let path = if endpoint.ends_with("/datasets") {
        endpoint.to_string()
    } else {
        format!("{endpoint}/datasets")
    };

    let mut url = Url::parse(&path).ok()?;
    url.set_query(query);
    if !url.query_pairs().any(|(key, _)| key == "_locale") {
        url.query_pairs_mut().append_pair("_locale", "default");
    }
    Some(url.into())
}

/// Decode a response body into datasets, unwrapping one level of string
/// encoding first.
pub fn decode_collection(body: Value) -> Result<Vec<Dataset>, LoadError> {
    let mut body = match body {
        Value::String(inner) => serde_json::from_str(&inner)
            .map_err(|e| LoadError::NestedJson(e.to_string()))?,
        other => other,
    };

    let is_collection = body.get("type").and_then(Value::as_str) == Some(COLLECTION_TYPE);
    let entries = match body.get_mut("datasets").map(Value::take) {
        Some(Value::Array(entries)) if is_collection => entries,
        _ => return Err(LoadError::UnexpectedShape),
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(dataset) => Some(dataset),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed dataset entry");
                None
            }
        })
        .collect())
}

/// Fetches dataset collections directly or through the dataset proxy.
#[derive(Clone)]
pub struct DatasetLoader {
    http: reqwest::Client,
    proxy_url: Option<String>,
}

impl DatasetLoader {
    /// `proxy_url` is the full URL of `POST /proxy-datasets`. When set, every
    /// request goes through it.
    pub fn new(proxy_url: Option<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            proxy_url: proxy_url.filter(|s| !s.is_empty()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.proxy_url.clone(), config.upstream_timeout)
    }

    /// Load datasets, never failing: errors are logged and returned next to
    /// an empty list.
    pub async fn load_datasets(&self, rest_uri: &str) -> DatasetLoad {
        match self.try_load(rest_uri).await {
            Ok(datasets) => {
                tracing::info!(count = datasets.len(), "Datasets loaded");
                DatasetLoad {
                    datasets,
                    error: None,
                }
            }
            Err(e) => {
                if e.is_validation() {
                    tracing::warn!(error = %e, "Dataset request rejected");
                } else {
                    tracing::error!(error = %e, "Fetching datasets failed");
                }
                DatasetLoad {
                    datasets: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }

    /// Load datasets, returning the first error.
    pub async fn try_load(&self, rest_uri: &str) -> Result<Vec<Dataset>, LoadError> {
        let target = DatasetTarget::parse(rest_uri)?;

        let body = match self.proxy_url.as_deref() {
            Some(proxy) => self.fetch_via_proxy(proxy, &target).await?,
            None if target.has_credentials() => return Err(LoadError::ProxyRequired),
            None => self.fetch_direct(&target.url).await?,
        };

        decode_collection(body)
    }

    async fn fetch_via_proxy(
        &self,
        proxy: &str,
        target: &DatasetTarget,
    ) -> Result<Value, LoadError> {
        tracing::debug!(url = %target.url, proxy, "Fetching datasets via proxy");

        let request = ProxyRequest {
            url: Some(target.url.clone()),
            username: target.username.clone(),
            password: target.password.clone(),
        };

        let response = self
            .http
            .post(proxy)
            .json(&request)
            .send()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        read_body(response).await
    }

    async fn fetch_direct(&self, url: &str) -> Result<Value, LoadError> {
        tracing::debug!(url, "Fetching datasets");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        read_body(response).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<Value, LoadError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ProxyErrorEnvelope>(&text)
            .map(|envelope| envelope.debug_info)
            .ok()
            .filter(|info| !info.is_empty())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(LoadError::Upstream {
            status: status.as_u16(),
            detail,
        });
    }

    response
        .json()
        .await
        .map_err(|e| LoadError::NestedJson(e.to_string()))
}
