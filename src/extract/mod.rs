//! Inline data extraction pipeline.
//!
//! Three stages evaluated strictly in sequence: locate the hydration
//! script, isolate one balanced JSON object from it, and project the
//! parsed tree into a flat `SongInfo`. Every stage may terminate with
//! "not found" as a normal value; each call is pure given its HTML input.

pub mod isolate;
pub mod locate;
pub mod project;

use serde::Serialize;
use serde_json::Value;

use crate::models::SongInfo;

pub use isolate::{IsolateStrategy, isolate_json};
pub use locate::{LocateStrategy, locate_data_script};
pub use project::{DEFAULT_LOADER_KEY, format_lrc_time, format_lyrics, project_song_info};

/// Options for a pipeline invocation.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Collect `ExtractionDebug` artifacts alongside the result.
    pub debug: bool,
    /// Loader-data key to try first; defaults to [`DEFAULT_LOADER_KEY`].
    pub expected_loader_key: Option<String>,
}

/// Diagnostic artifacts collected when debug mode is on. Additive only:
/// collecting these never changes the outcome of the plain path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionDebug {
    pub logs: Vec<String>,
    #[serde(rename = "foundScriptTags")]
    pub found_script_tags: usize,
    #[serde(rename = "matchedStrategy", skip_serializing_if = "Option::is_none")]
    pub matched_strategy: Option<String>,
    #[serde(rename = "scriptPreviewStart", skip_serializing_if = "Option::is_none")]
    pub script_preview_start: Option<String>,
    #[serde(rename = "scriptPreviewEnd", skip_serializing_if = "Option::is_none")]
    pub script_preview_end: Option<String>,
    #[serde(rename = "jsonLength", skip_serializing_if = "Option::is_none")]
    pub json_length: Option<usize>,
    #[serde(rename = "loaderKeys", skip_serializing_if = "Option::is_none")]
    pub loader_keys: Option<Vec<String>>,
}

impl ExtractionDebug {
    fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }
}

/// Outcome of the locate + isolate + parse stages.
///
/// `parsed == None` with `json_text == Some(..)` means a region was
/// isolated but was not valid JSON, a failure mode distinct from
/// "no data found".
#[derive(Debug, Clone, Default)]
pub struct InlineData {
    pub parsed: Option<Value>,
    pub json_text: Option<String>,
    pub debug: Option<ExtractionDebug>,
}

/// Run the locate, isolate and parse stages over a raw HTML document.
pub fn extract_inline_data(html: &str, options: &ExtractOptions) -> InlineData {
    let mut debug = options.debug.then(ExtractionDebug::default);
    if let Some(d) = debug.as_mut() {
        d.log(format!("HTML length: {}", html.len()));
    }

    let (located, script_count) = locate_data_script(html);
    if let Some(d) = debug.as_mut() {
        d.found_script_tags = script_count;
    }
    let Some(located) = located else {
        tracing::debug!(script_count, "no candidate script tag containing inline data");
        if let Some(d) = debug.as_mut() {
            d.log("No candidate script tag containing inline data");
        }
        return InlineData { parsed: None, json_text: None, debug };
    };

    let script = located.body.trim();
    if let Some(d) = debug.as_mut() {
        if located.strategy == LocateStrategy::AssignmentScan {
            d.log("marker script not found, matched by assignment scan");
        }
        d.script_preview_start = Some(head_chars(script, 200).to_string());
        d.script_preview_end = Some(tail_chars(script, 200).to_string());
    }

    let Some((json_text, strategy)) = isolate_json(script) else {
        tracing::debug!("failed to isolate JSON text from script content");
        if let Some(d) = debug.as_mut() {
            d.log("Failed to isolate JSON text from script content");
        }
        return InlineData { parsed: None, json_text: None, debug };
    };
    if let Some(d) = debug.as_mut() {
        d.matched_strategy = Some(strategy.as_str().to_string());
        d.json_length = Some(json_text.len());
    }

    match serde_json::from_str::<Value>(json_text) {
        Ok(parsed) => {
            if let Some(d) = debug.as_mut() {
                match parsed.get("loaderData").and_then(Value::as_object) {
                    Some(map) => {
                        d.loader_keys = Some(map.keys().cloned().collect());
                    }
                    None => d.log("parsed data has no loaderData map"),
                }
            }
            InlineData {
                parsed: Some(parsed),
                json_text: Some(json_text.to_string()),
                debug,
            }
        }
        Err(err) => {
            // Isolated but malformed: distinct from "not found", collapsed
            // to "no data" on the plain path.
            tracing::debug!(strategy = strategy.as_str(), %err, "isolated text is not valid JSON");
            if let Some(d) = debug.as_mut() {
                d.log(format!("JSON parse failed: {err}"));
            }
            InlineData {
                parsed: None,
                json_text: Some(json_text.to_string()),
                debug,
            }
        }
    }
}

/// The single composed entry point: locate, isolate, parse and project.
pub fn extract_song_info(html: &str) -> Option<SongInfo> {
    let inline = extract_inline_data(html, &ExtractOptions::default());
    inline
        .parsed
        .as_ref()
        .and_then(|parsed| project_song_info(parsed, DEFAULT_LOADER_KEY))
}

/// First `max` characters of `s`, cut on a character boundary.
fn head_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Last `max` characters of `s`, cut on a character boundary.
fn tail_chars(s: &str, max: usize) -> &str {
    let total = s.chars().count();
    if total <= max {
        return s;
    }
    match s.char_indices().nth(total - max) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn song_page_html() -> String {
        let tree = json!({
            "loaderData": {
                "song_(id)/page": {
                    "audioWithLyricsOption": {
                        "url": "https://cdn.example.com/a.mp3",
                        "coverURL": "https://cdn.example.com/c.jpg",
                        "lyrics": {
                            "lyricType": "krc",
                            "sentences": [
                                {"text": "作曲：王五", "type": "lrc"},
                                {
                                    "startMs": 61_234,
                                    "endMs": 62_000,
                                    "text": "Hi",
                                    "words": [{"text": "Hi", "startMs": 61_234, "endMs": 62_000}]
                                }
                            ]
                        },
                        "trackInfo": {
                            "name": "Song",
                            "artists": [{"name": "Someone"}],
                            "album": {"name": "Album"}
                        }
                    }
                }
            },
            "errors": null
        });
        format!(
            concat!(
                "<html><head><script>telemetry()</script></head><body>",
                r#"<script data-script-src="modern-inline">window._ROUTER_DATA = {};</script>"#,
                "</body></html>"
            ),
            serde_json::to_string(&tree).unwrap()
        )
    }

    #[test]
    fn test_full_pipeline() {
        let html = song_page_html();
        let song = extract_song_info(&html).unwrap();
        assert_eq!(song.title, "Song");
        assert_eq!(song.lyrics.lrc, "[01:01.23]Hi");
        assert_eq!(song.lyrics.word_lrc, "[01:01.23]<61234,62000>Hi");
        let contributors = song.contributors.as_ref().unwrap();
        assert_eq!(contributors.composers, Some(vec!["王五".to_string()]));
        assert!(contributors.lyricists.is_none());
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let html = song_page_html();
        let first = extract_song_info(&html).unwrap();
        let second = extract_song_info(&html).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_debug_artifacts_do_not_change_outcome() {
        let html = song_page_html();
        let plain = extract_inline_data(&html, &ExtractOptions::default());
        let verbose = extract_inline_data(
            &html,
            &ExtractOptions { debug: true, expected_loader_key: None },
        );
        assert_eq!(plain.parsed, verbose.parsed);
        assert_eq!(plain.json_text, verbose.json_text);
        assert!(plain.debug.is_none());

        let debug = verbose.debug.unwrap();
        assert_eq!(debug.found_script_tags, 2);
        assert_eq!(debug.matched_strategy.as_deref(), Some("balanced-brace-after-equals"));
        assert_eq!(debug.loader_keys, Some(vec!["song_(id)/page".to_string()]));
        assert!(debug.script_preview_start.is_some());
        assert!(debug.json_length.is_some());
    }

    #[test]
    fn test_no_data_html() {
        let inline = extract_inline_data(
            "<html><script>a()</script></html>",
            &ExtractOptions { debug: true, expected_loader_key: None },
        );
        assert!(inline.parsed.is_none());
        assert!(inline.json_text.is_none());
        assert!(inline.debug.unwrap().found_script_tags >= 1);
        assert!(extract_song_info("<html></html>").is_none());
    }

    #[test]
    fn test_malformed_json_distinguished_from_not_found() {
        let html = r#"<script data-script-src="modern-inline">_ROUTER_DATA = {"a": };</script>"#;
        let inline = extract_inline_data(html, &ExtractOptions { debug: true, ..Default::default() });
        assert!(inline.parsed.is_none());
        assert!(inline.json_text.is_some());
        let debug = inline.debug.unwrap();
        assert!(debug.logs.iter().any(|l| l.contains("JSON parse failed")));
    }

    #[test]
    fn test_preview_helpers_respect_char_boundaries() {
        let s = "好".repeat(300);
        assert_eq!(head_chars(&s, 200).chars().count(), 200);
        assert_eq!(tail_chars(&s, 200).chars().count(), 200);
        assert_eq!(head_chars("short", 200), "short");
        assert_eq!(tail_chars("short", 200), "short");
    }
}
