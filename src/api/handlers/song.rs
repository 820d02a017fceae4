//! Song extraction handler.
//!
//! `GET /api/song/{id}` fetches the upstream page, runs the extraction
//! pipeline and returns the flat `SongInfo`. A debug query flag returns
//! the intermediate artifacts as well; a format flag renders the result
//! as an importable JS module instead of JSON.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::AppState;
use crate::api::error::ApiError;
use crate::extract::{DEFAULT_LOADER_KEY, ExtractOptions, ExtractionDebug, extract_inline_data,
    project_song_info};
use crate::fetch::PageFetcher;
use crate::models::SongInfo;

/// Query parameters for the song endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SongParams {
    /// Return intermediate extraction artifacts ("1" or "true").
    pub debug: Option<String>,
    /// Output format: "json" (default) or "js".
    pub format: Option<String>,
    /// Variable name for the "js" format.
    pub var: Option<String>,
}

/// Extended payload returned when debug mode is requested.
#[derive(Debug, Serialize)]
struct DebugPayload {
    song: Option<SongInfo>,
    #[serde(rename = "parsedData", skip_serializing_if = "Option::is_none")]
    parsed_data: Option<Value>,
    #[serde(rename = "jsonText")]
    json_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<ExtractionDebug>,
    from: &'static str,
    source: String,
}

/// GET /api/song/{id}
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SongParams>,
) -> Response {
    if id.trim().is_empty() {
        return ApiError::BadRequest("song id is required".into()).into_response();
    }

    let html = match state.fetcher.fetch_song_page(&id).await {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!(%id, %err, "song page fetch failed");
            return ApiError::from(err).into_response();
        }
    };

    let debug_enabled = matches!(params.debug.as_deref(), Some("1" | "true"));
    let options = ExtractOptions {
        debug: debug_enabled,
        expected_loader_key: Some(DEFAULT_LOADER_KEY.to_string()),
    };
    let loader_key = options
        .expected_loader_key
        .as_deref()
        .unwrap_or(DEFAULT_LOADER_KEY);

    let inline = extract_inline_data(&html, &options);
    let song = inline
        .parsed
        .as_ref()
        .and_then(|parsed| project_song_info(parsed, loader_key));

    if params.format.as_deref() == Some("js") {
        let Some(song) = song else {
            return ApiError::NotFound("no song data for JS output".into()).into_response();
        };
        let variable = params.var.as_deref().unwrap_or("song");
        let module = song.to_js_module(variable);
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
            module,
        )
            .into_response();
    }

    if !debug_enabled {
        return match song {
            Some(song) => Json(song).into_response(),
            None => ApiError::NotFound(
                "the song may not exist or the page structure has changed".into(),
            )
            .into_response(),
        };
    }

    let status = if song.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    let payload = DebugPayload {
        song,
        parsed_data: inline.parsed,
        json_text: inline.json_text,
        debug: inline.debug,
        from: "douyin",
        source: PageFetcher::song_page_url(&id),
    };
    (status, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_values() {
        for (given, expected) in [
            (Some("1"), true),
            (Some("true"), true),
            (Some("0"), false),
            (Some("yes"), false),
            (None, false),
        ] {
            let enabled = matches!(given, Some("1" | "true"));
            assert_eq!(enabled, expected, "debug={given:?}");
        }
    }

    #[test]
    fn test_debug_payload_serialization() {
        let payload = DebugPayload {
            song: None,
            parsed_data: None,
            json_text: None,
            debug: None,
            from: "douyin",
            source: "https://example.com".into(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        let obj = value.as_object().unwrap();
        // jsonText stays present (null) even when isolation failed; the
        // optional artifacts are dropped.
        assert!(obj.contains_key("jsonText"));
        assert!(!obj.contains_key("parsedData"));
        assert_eq!(obj["from"], "douyin");
    }
}
