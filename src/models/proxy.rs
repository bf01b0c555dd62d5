// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dataset proxy wire types, shared by the route and the loader.

use super::de::null_as_default;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /proxy-datasets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProxyRequest {
    #[validate(url)]
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,
}

/// Error body returned by the proxy when the upstream call fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyErrorEnvelope {
    pub error: bool,
    pub message: String,
    #[serde(default)]
    pub debug_info: String,
}
