// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dataset proxy route.
//!
//! Lets the browser read credential-protected Openkaarten endpoints without
//! ever holding the credentials' Basic auth header itself.

use crate::error::{AppError, Result};
use crate::models::ProxyRequest;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/proxy-datasets", post(proxy_datasets))
}

/// Fetch `url` upstream with Basic auth and relay the JSON body.
async fn proxy_datasets(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProxyRequest>,
) -> Result<Json<Value>> {
    let url = match request.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return Err(AppError::MissingParams),
    };

    if request.validate().is_err() || !is_http_url(url) {
        tracing::warn!(url, "Rejected proxy request with invalid URL");
        return Err(AppError::MissingParams);
    }

    let body = state
        .proxy
        .fetch(url, &request.username, &request.password)
        .await?;
    Ok(Json(body))
}

fn is_http_url(url: &str) -> bool {
    reqwest::Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}
