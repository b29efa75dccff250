use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use shiori_core::config::GatewayConfig;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::error::GatewayError;

/// Shared handler state: the outbound client and where to send requests.
#[derive(Debug, Clone)]
pub struct GatewayState {
    http: reqwest::Client,
    upstream: Arc<str>,
    prefix: Arc<str>,
}

impl GatewayState {
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(
            &config.upstream_base_url,
            config.prefix(),
            http,
        ))
    }

    pub fn with_client(upstream: &str, prefix: &str, http: reqwest::Client) -> Self {
        Self {
            http,
            upstream: upstream.trim_end_matches('/').into(),
            prefix: prefix.trim_matches('/').into(),
        }
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Router with the catch-all proxy route mounted under `/{prefix}/`.
pub fn router(state: GatewayState) -> Router {
    let route = format!("/{}/{{*path}}", state.prefix);
    Router::new()
        .route(&route, any(forward))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Rebuild the upstream URL for `uri`. The path after the prefix and the
/// raw query string are kept byte for byte, so percent-encoding, parameter
/// order and repeated keys all survive.
pub fn upstream_url(upstream: &str, prefix: &str, uri: &Uri) -> String {
    let path = uri.path().trim_start_matches('/');
    let path = path
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path);
    let base = upstream.trim_end_matches('/');

    match uri.query() {
        Some(query) if !query.is_empty() => format!("{base}/{path}?{query}"),
        _ => format!("{base}/{path}"),
    }
}

/// Forward one request upstream and relay the outcome.
pub async fn forward(
    State(state): State<GatewayState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let target = upstream_url(&state.upstream, &state.prefix, &uri);
    debug!(%method, %target, "forwarding");

    let mut request = state
        .http
        .request(method.clone(), target.as_str())
        .header(ACCEPT, "application/json");
    if !body.is_empty() {
        if let Some(content_type) = headers.get(CONTENT_TYPE) {
            request = request.header(CONTENT_TYPE, content_type.clone());
        }
        request = request.body(body);
    }

    let upstream = request.send().await.map_err(|e| {
        warn!(%method, %target, error = %e, "upstream unreachable");
        GatewayError::forwarding_failed()
    })?;

    let status = upstream.status();
    if !status.is_success() {
        let body = upstream.bytes().await.unwrap_or_default();
        warn!(%method, %target, status = status.as_u16(), "upstream returned error");
        return Err(GatewayError::from_upstream(status, &body));
    }

    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let body = upstream.bytes().await.map_err(|e| {
        warn!(%method, %target, error = %e, "failed reading upstream body");
        GatewayError::forwarding_failed()
    })?;

    let mut response = (status, body).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}
