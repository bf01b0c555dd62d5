// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side dataset proxy.
//!
//! Fetches an Openkaarten endpoint with Basic auth so credentials never reach
//! the browser, and relays the body unchanged.

use crate::error::AppError;
use reqwest::header;
use serde_json::Value;
use std::time::Duration;

/// Upstream client for `POST /proxy-datasets`.
#[derive(Clone)]
pub struct DatasetProxy {
    http: reqwest::Client,
}

impl DatasetProxy {
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { http }
    }

    /// GET `url` with Basic auth built from `username:password`.
    ///
    /// Any status other than 200 is an error, even other 2xx codes. A body
    /// that is not JSON is relayed as `null`.
    pub async fn fetch(
        &self,
        url: &str,
        username: &str,
        password: &str,
    ) -> Result<Value, AppError> {
        let response = self
            .http
            .get(url)
            .basic_auth(username, Some(password))
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url, error = %e, "Fetch error");
                AppError::UpstreamTransport(e.to_string())
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            tracing::error!(url, status, "Unexpected HTTP status code");
            return Err(AppError::UpstreamStatus(status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamTransport(e.to_string()))?;

        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::debug!(url, error = %e, "Upstream body is not JSON");
            Value::Null
        }))
    }
}
