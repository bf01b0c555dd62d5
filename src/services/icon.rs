// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marker icon resolution.
//!
//! Handles:
//! - Built-in pin fallback when no remote icon is configured
//! - Hosted `<img>` placeholder returned with zero latency
//! - Async fetch, recolour and inline of the remote SVG
//! - Process-wide cache keyed by (icon file name, colour)
//! - Liveness check before touching a marker that may have been removed

use crate::config::Config;
use crate::models::{IconAsset, MarkerIconRequest, SourceKind};
use crate::services::container::escape_attr;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const FALLBACK_CLASS: &str = "leaflet-custom-icon--inline-svg";
const HOSTED_CLASS: &str = "leaflet-custom-icon--hosted-svg";

const FALLBACK_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" height="24" width="24"><g transform="translate(0 -1028.4)"><path d="m12.031 1030.4c-3.8657 0-6.9998 3.1-6.9998 7 0 1.3 0.4017 2.6 1.0938 3.7 0.0334 0.1 0.059 0.1 0.0938 0.2l4.3432 8c0.204 0.6 0.782 1.1 1.438 1.1s1.202-0.5 1.406-1.1l4.844-8.7c0.499-1 0.781-2.1 0.781-3.2 0-3.9-3.134-7-7-7zm-0.031 3.9c1.933 0 3.5 1.6 3.5 3.5 0 2-1.567 3.5-3.5 3.5s-3.5-1.5-3.5-3.5c0-1.9 1.567-3.5 3.5-3.5z" fill="{color}"/><path d="m12.031 1.0312c-3.8657 0-6.9998 3.134-6.9998 7 0 1.383 0.4017 2.6648 1.0938 3.7498 0.0334 0.053 0.059 0.105 0.0938 0.157l4.3432 8.062c0.204 0.586 0.782 1.031 1.438 1.031s1.202-0.445 1.406-1.031l4.844-8.75c0.499-0.963 0.781-2.06 0.781-3.2188 0-3.866-3.134-7-7-7zm-0.031 3.9688c1.933 0 3.5 1.567 3.5 3.5s-1.567 3.5-3.5 3.5-3.5-1.567-3.5-3.5 1.567-3.5 3.5-3.5z" fill="{color}" transform="translate(0 1028.4)"/></g></svg>"#;

/// Cache key: icon file name plus fill colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconCacheKey {
    pub file_name: String,
    pub color: String,
}

/// Shared cache of recoloured inline SVG markup. Append-only.
pub type IconCache = Arc<DashMap<IconCacheKey, String>>;

/// Per-key locks so concurrent refinements of one icon fetch it once.
type FetchLocks = Arc<DashMap<IconCacheKey, Arc<Mutex<()>>>>;

/// Errors from fetching a remote icon. Never surfaced past the resolver.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("Icon request failed: {0}")]
    Network(String),

    #[error("Icon request returned HTTP {0}")]
    Status(u16),

    #[error("Icon body is not SVG markup")]
    NotSvg,
}

/// Fetch capability for remote SVG files.
pub trait IconFetcher: Send + Sync {
    fn fetch_svg<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, IconError>>;
}

/// `reqwest`-backed fetcher.
#[derive(Clone)]
pub struct HttpIconFetcher {
    http: reqwest::Client,
}

impl HttpIconFetcher {
    pub fn new(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { http }
    }
}

impl IconFetcher for HttpIconFetcher {
    fn fetch_svg<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, IconError>> {
        async move {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| IconError::Network(e.to_string()))?;

            if !response.status().is_success() {
                return Err(IconError::Status(response.status().as_u16()));
            }

            response
                .text()
                .await
                .map_err(|e| IconError::Network(e.to_string()))
        }
        .boxed()
    }
}

/// Liveness token shared between a rendered marker and its pending icon work.
///
/// Released when the marker leaves the map; a refinement that completes after
/// that is dropped.
#[derive(Debug, Clone)]
pub struct MarkerLease {
    live: Arc<AtomicBool>,
}

impl Default for MarkerLease {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerLease {
    pub fn new() -> Self {
        Self {
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn release(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// Remote icon work still to be done after `resolve` returned a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingIcon {
    pub key: IconCacheKey,
    pub fetch_url: String,
}

/// How an async refinement ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    /// Inline markup delivered to the marker.
    Applied,
    /// Marker was gone by the time the markup arrived.
    Dropped,
    /// Fetch failed; the placeholder stays.
    Failed,
}

/// Resolves marker icons, owning the icon cache.
#[derive(Clone)]
pub struct IconResolver {
    fetcher: Arc<dyn IconFetcher>,
    cache: IconCache,
    fetch_locks: FetchLocks,
    icon_base_url: Option<String>,
}

impl IconResolver {
    /// Create a resolver with a fresh cache.
    ///
    /// `icon_base_url` is where named icons of the shared icon set live.
    pub fn new(fetcher: Arc<dyn IconFetcher>, icon_base_url: Option<String>) -> Self {
        Self::with_cache(fetcher, Arc::new(DashMap::new()), icon_base_url)
    }

    /// Resolver fetching over HTTP with the configured icon set and timeout.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(HttpIconFetcher::new(config.upstream_timeout)),
            config.icon_base_url.clone(),
        )
    }

    pub fn with_cache(
        fetcher: Arc<dyn IconFetcher>,
        cache: IconCache,
        icon_base_url: Option<String>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            fetch_locks: Arc::new(DashMap::new()),
            icon_base_url: icon_base_url.filter(|s| !s.is_empty()),
        }
    }

    pub fn cache(&self) -> &IconCache {
        &self.cache
    }

    /// Produce a renderable icon now, plus the remote work still pending.
    pub fn resolve(&self, request: &MarkerIconRequest) -> (IconAsset, Option<PendingIcon>) {
        let color = request.color.as_str();

        let Some(fetch_url) = self.fetch_url(request) else {
            return (fallback_icon(color), None);
        };

        let key = IconCacheKey {
            file_name: icon_file_name(request).unwrap_or_else(|| file_name_from_url(&fetch_url)),
            color: color.to_string(),
        };

        if let Some(markup) = self.cached(&key) {
            tracing::trace!(file = %key.file_name, color, "Icon cache hit");
            return (inlined_icon(markup), None);
        }

        let src = request.url().unwrap_or(&fetch_url).to_string();
        (hosted_icon(&src, color), Some(PendingIcon { key, fetch_url }))
    }

    /// Fetch and inline a pending icon, then hand it to `redraw` if the
    /// marker is still live.
    pub async fn refine<R>(&self, pending: PendingIcon, lease: &MarkerLease, redraw: R) -> Refinement
    where
        R: FnOnce(IconAsset),
    {
        let markup = match self.fetch_inline(&pending).await {
            Ok(markup) => markup,
            Err(e) => {
                tracing::warn!(
                    url = %pending.fetch_url,
                    error = %e,
                    "SVG fetch failed, keeping placeholder"
                );
                return Refinement::Failed;
            }
        };

        if !lease.is_live() {
            tracing::debug!(url = %pending.fetch_url, "Marker removed before icon resolved");
            return Refinement::Dropped;
        }

        redraw(inlined_icon(markup));
        Refinement::Applied
    }

    /// Run `refine` on the tokio runtime.
    pub fn spawn_refinement<R>(
        self: &Arc<Self>,
        pending: PendingIcon,
        lease: MarkerLease,
        redraw: R,
    ) -> JoinHandle<Refinement>
    where
        R: FnOnce(IconAsset) + Send + 'static,
    {
        let resolver = Arc::clone(self);
        tokio::spawn(async move { resolver.refine(pending, &lease, redraw).await })
    }

    async fn fetch_inline(&self, pending: &PendingIcon) -> Result<String, IconError> {
        // Another marker may have finished the same key meanwhile.
        if let Some(markup) = self.cached(&pending.key) {
            return Ok(markup);
        }

        let lock = self
            .fetch_locks
            .entry(pending.key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-check after acquiring the lock
        if let Some(markup) = self.cached(&pending.key) {
            return Ok(markup);
        }

        tracing::debug!(url = %pending.fetch_url, "Fetching SVG icon");
        let svg = self.fetcher.fetch_svg(&pending.fetch_url).await?;
        if !svg.contains("<svg") {
            return Err(IconError::NotSvg);
        }

        let markup = recolor_svg(&svg, &pending.key.color);
        self.cache.insert(pending.key.clone(), markup.clone());
        Ok(markup)
    }

    fn cached(&self, key: &IconCacheKey) -> Option<String> {
        self.cache.get(key).map(|entry| entry.value().clone())
    }

    fn fetch_url(&self, request: &MarkerIconRequest) -> Option<String> {
        match (request.name(), self.icon_base_url.as_deref()) {
            (Some(name), Some(base)) => Some(format!("{}/{}.svg", base.trim_end_matches('/'), name)),
            _ => request.url().map(str::to_string),
        }
    }
}

/// Replace every `fill="…"` with the given colour, or add a fill to the
/// first `<path` when the markup declares none.
pub fn recolor_svg(svg: &str, color: &str) -> String {
    const FILL: &str = "fill=\"";

    if !svg.contains("fill=") {
        return svg.replacen("<path", &format!("<path fill=\"{color}\""), 1);
    }

    let mut out = String::with_capacity(svg.len());
    let mut rest = svg;
    while let Some(start) = rest.find(FILL) {
        let value_start = start + FILL.len();
        let Some(value_len) = rest[value_start..].find('"') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(FILL);
        out.push_str(color);
        out.push('"');
        rest = &rest[value_start + value_len + 1..];
    }
    out.push_str(rest);
    out
}

fn icon_file_name(request: &MarkerIconRequest) -> Option<String> {
    request.name().map(|name| format!("{name}.svg"))
}

/// Last path segment of a URL, ignoring query and fragment.
fn file_name_from_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .unwrap_or_default(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default()
            .to_string(),
    }
}

/// Built-in pin tinted with `color`.
pub fn fallback_icon(color: &str) -> IconAsset {
    let color = escape_attr(color);
    IconAsset {
        html: FALLBACK_SVG.replace("{color}", &color),
        class_name: format!("{FALLBACK_CLASS} {color}"),
        anchor_point: (12, 32),
        size: (44, 44),
        popup_anchor: (0, -28),
        source_kind: SourceKind::InlineFallback,
    }
}

fn hosted_icon(src: &str, color: &str) -> IconAsset {
    IconAsset {
        html: format!(
            r#"<div class="leaflet-svg {}"><img src="{}" /></div>"#,
            escape_attr(color),
            escape_attr(src)
        ),
        class_name: HOSTED_CLASS.to_string(),
        anchor_point: (12, 32),
        size: (25, 30),
        popup_anchor: (0, -28),
        source_kind: SourceKind::RemoteHosted,
    }
}

fn inlined_icon(markup: String) -> IconAsset {
    IconAsset {
        html: markup,
        class_name: HOSTED_CLASS.to_string(),
        anchor_point: (12, 32),
        size: (25, 30),
        popup_anchor: (0, -28),
        source_kind: SourceKind::RemoteInlined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverFetch;

    impl IconFetcher for NeverFetch {
        fn fetch_svg<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<String, IconError>> {
            async { Err(IconError::Network("offline".to_string())) }.boxed()
        }
    }

    fn resolver(base: Option<&str>) -> IconResolver {
        IconResolver::new(Arc::new(NeverFetch), base.map(str::to_string))
    }

    #[test]
    fn test_recolor_replaces_every_fill() {
        let svg = r##"<svg><path fill="#000"/><circle fill="red"/></svg>"##;
        assert_eq!(
            recolor_svg(svg, "#123456"),
            r##"<svg><path fill="#123456"/><circle fill="#123456"/></svg>"##
        );
    }

    #[test]
    fn test_recolor_injects_fill_on_first_path() {
        let svg = r#"<svg><path d="M0"/><path d="M1"/></svg>"#;
        assert_eq!(
            recolor_svg(svg, "blue"),
            r#"<svg><path fill="blue" d="M0"/><path d="M1"/></svg>"#
        );
    }

    #[test]
    fn test_no_remote_reference_uses_fallback() {
        let (asset, pending) = resolver(None).resolve(&MarkerIconRequest::new("#ff0000"));
        assert_eq!(asset.source_kind, SourceKind::InlineFallback);
        assert!(asset.html.contains(r##"fill="#ff0000""##));
        assert_eq!(asset.size, (44, 44));
        assert!(pending.is_none());

        // Empty strings count as absent.
        let blank = MarkerIconRequest::new("red").with_url("").with_name(" ");
        assert!(resolver(None).resolve(&blank).1.is_none());
    }

    #[test]
    fn test_named_icon_without_icon_set_falls_back() {
        let request = MarkerIconRequest::new("red").with_name("afval");
        let (asset, pending) = resolver(None).resolve(&request);
        assert_eq!(asset.source_kind, SourceKind::InlineFallback);
        assert!(pending.is_none());
    }

    #[test]
    fn test_remote_icon_returns_hosted_placeholder() {
        let request = MarkerIconRequest::new("red").with_url("https://cdn.example.org/icons/bin.svg?v=2");
        let (asset, pending) = resolver(None).resolve(&request);

        assert_eq!(asset.source_kind, SourceKind::RemoteHosted);
        assert!(asset.html.contains("https://cdn.example.org/icons/bin.svg?v=2"));
        let pending = pending.expect("pending work");
        assert_eq!(pending.key.file_name, "bin.svg");
        assert_eq!(pending.key.color, "red");
    }

    #[test]
    fn test_named_icon_uses_icon_set() {
        let request = MarkerIconRequest::new("red")
            .with_url("https://cdn.example.org/other.svg")
            .with_name("afval");
        let (_, pending) = resolver(Some("https://site.example/icons/")).resolve(&request);
        let pending = pending.expect("pending work");
        assert_eq!(pending.fetch_url, "https://site.example/icons/afval.svg");
        assert_eq!(pending.key.file_name, "afval.svg");
    }

    #[test]
    fn test_cache_hit_is_synchronous() {
        let resolver = resolver(None);
        resolver.cache().insert(
            IconCacheKey {
                file_name: "bin.svg".to_string(),
                color: "red".to_string(),
            },
            "<svg>cached</svg>".to_string(),
        );

        let request = MarkerIconRequest::new("red").with_url("https://cdn.example.org/bin.svg");
        let (asset, pending) = resolver.resolve(&request);
        assert_eq!(asset.source_kind, SourceKind::RemoteInlined);
        assert_eq!(asset.html, "<svg>cached</svg>");
        assert!(pending.is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_placeholder() {
        let resolver = resolver(None);
        let request = MarkerIconRequest::new("red").with_url("https://cdn.example.org/bin.svg");
        let (_, pending) = resolver.resolve(&request);

        let mut redrawn = false;
        let outcome = resolver
            .refine(pending.unwrap(), &MarkerLease::new(), |_| redrawn = true)
            .await;

        assert_eq!(outcome, Refinement::Failed);
        assert!(!redrawn);
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn test_lease_release() {
        let lease = MarkerLease::new();
        let shared = lease.clone();
        assert!(shared.is_live());
        lease.release();
        assert!(!shared.is_live());
    }
}
