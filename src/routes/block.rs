// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streetmap block rendering.

use crate::services::container::{render_container, BlockAttributes};
use crate::AppState;
use axum::{extract::State, response::Html, routing::post, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/render-block", post(render_block))
}

/// Render the mount container for the saved block attributes.
async fn render_block(
    State(state): State<Arc<AppState>>,
    Json(attributes): Json<BlockAttributes>,
) -> Html<String> {
    Html(render_container(
        &attributes,
        &state.config.site_rest_root,
        &state.config.tile_layer_uri,
    ))
}
