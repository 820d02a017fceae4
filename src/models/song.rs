//! Song page data models.
//!
//! `SongInfo` is the flat, display-ready shape produced by the extraction
//! pipeline. Lyric records mirror the page's hydration payload; enriched
//! fields are carried verbatim as JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single word of a timed lyric line.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LyricWord {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "startMs", default)]
    pub start_ms: i64,
    #[serde(rename = "endMs", default)]
    pub end_ms: i64,
}

/// One lyric line. Lines with `kind == "lrc"` are metadata (credits)
/// rather than sung content and carry no words.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct LyricSentence {
    #[serde(rename = "startMs", default)]
    pub start_ms: i64,
    #[serde(rename = "endMs", default)]
    pub end_ms: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Vec<LyricWord>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// The lyric block of an `audioWithLyricsOption` node.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Lyrics {
    #[serde(rename = "lyricType", default)]
    pub lyric_type: String,
    #[serde(default)]
    pub sentences: Vec<LyricSentence>,
}

/// The two derived lyric text blocks: standard LRC and word-level
/// (enhanced) LRC.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormattedLyrics {
    pub lrc: String,
    #[serde(rename = "wordLrc")]
    pub word_lrc: String,
}

/// Lyricist/composer names recovered from metadata lyric lines.
/// A field is omitted entirely when its list is empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contributors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyricists: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composers: Option<Vec<String>>,
}

/// Flat song record combining identity fields, the two lyric encodings
/// and enriched passthrough data copied verbatim from the page payload.
///
/// The projector never emits a partial value: either every identity field
/// resolves or projection yields `None`. Enriched fields are optional and
/// dropped from the serialized form when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongInfo {
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    #[serde(rename = "coverUrl")]
    pub cover_url: String,
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
    pub lyrics: FormattedLyrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributors: Option<Contributors>,
    #[serde(rename = "trackInfo", skip_serializing_if = "Option::is_none")]
    pub track_info: Option<Value>,
    #[serde(rename = "bitRates", skip_serializing_if = "Option::is_none")]
    pub bit_rates: Option<Value>,
    #[serde(rename = "labelInfo", skip_serializing_if = "Option::is_none")]
    pub label_info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Value>,
    #[serde(rename = "albumInfo", skip_serializing_if = "Option::is_none")]
    pub album_info: Option<Value>,
    #[serde(rename = "artistDetails", skip_serializing_if = "Option::is_none")]
    pub artist_details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Value>,
    #[serde(rename = "artistTracks", skip_serializing_if = "Option::is_none")]
    pub artist_tracks: Option<Value>,
    #[serde(rename = "relatedTracks", skip_serializing_if = "Option::is_none")]
    pub related_tracks: Option<Value>,
    #[serde(rename = "chartTracks", skip_serializing_if = "Option::is_none")]
    pub chart_tracks: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Value>,
}

impl SongInfo {
    /// Render the song as an importable JavaScript module, for downstream
    /// tooling that consumes the extraction as source code.
    pub fn to_js_module(&self, variable_name: &str) -> String {
        let json = serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| "null".to_string());
        format!("const {variable_name} = {json};\nexport default {variable_name};\n")
    }
}
