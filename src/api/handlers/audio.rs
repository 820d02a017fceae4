//! Audio relay handler.
//!
//! `GET /api/proxy/audio?url=...` is a pass-through, byte-range-aware
//! proxy for the resolved audio URL. The client `Range` header goes
//! upstream, the upstream status comes back verbatim, and only a
//! whitelist of response headers is mirrored. The payload is streamed,
//! never buffered or inspected.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::api::AppState;
use crate::api::error::ApiError;

/// Response headers forwarded from the upstream audio server.
const FORWARDED_HEADERS: [HeaderName; 7] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::ACCEPT_RANGES,
    header::CONTENT_RANGE,
    header::ETAG,
    header::LAST_MODIFIED,
    header::CACHE_CONTROL,
];

/// Query parameters for the audio proxy endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AudioProxyParams {
    /// Absolute http(s) URL of the audio resource.
    pub url: Option<String>,
}

/// GET /api/proxy/audio
pub async fn proxy_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AudioProxyParams>,
) -> Response {
    let url = match params.url.as_deref().filter(|u| is_http_url(u)) {
        Some(url) => url,
        None => return ApiError::BadRequest("invalid url".into()).into_response(),
    };

    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    let upstream = match state.fetcher.fetch_audio(url, range).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(%url, %err, "audio proxy fetch failed");
            return ApiError::from(err).into_response();
        }
    };

    let status = upstream.status();
    let mut response_headers = HeaderMap::new();
    for name in FORWARDED_HEADERS {
        if let Some(value) = upstream.headers().get(&name) {
            response_headers.insert(name, value.clone());
        }
    }

    let body = Body::from_stream(upstream.bytes_stream());
    (status, response_headers, body).into_response()
}

/// Accepts absolute http/https URLs only, case-insensitive on the scheme.
fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
