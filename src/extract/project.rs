//! Projection of the parsed hydration tree into a flat `SongInfo`.
//!
//! Node selection walks the loader-data map; lyric formatting derives the
//! two textual encodings (standard LRC and word-level LRC); contributor
//! extraction pattern-matches the metadata lyric lines for lyricist and
//! composer credits.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{Contributors, FormattedLyrics, Lyrics, SongInfo};

/// Loader-data key the song page payload lives under on current pages.
pub const DEFAULT_LOADER_KEY: &str = "song_(id)/page";

/// Credit line prefixes, CJK and Latin, with full- or half-width colon.
static LYRICIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:作词|词|Lyricist|Lyrics\s*by)[:：]\s*(.+)$").expect("lyricist regex")
});
static COMPOSER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:作曲|曲|Composer|Music\s*by)[:：]\s*(.+)$").expect("composer regex")
});

/// Separators between names in a credit line: slash, CJK and Latin commas,
/// semicolons, whitespace runs.
static NAME_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/、，,;；\s]+").expect("name split regex"));

/// Locate the song page node and map it into a `SongInfo`.
///
/// The node is looked up under `loaderData` by `expected_key`; if absent,
/// the map's entries are scanned in insertion order for the first value
/// that structurally carries an `audioWithLyricsOption` object. All
/// identity fields must resolve or the projection yields `None` as a
/// whole; enriched fields are optional passthroughs.
pub fn project_song_info(parsed: &Value, expected_key: &str) -> Option<SongInfo> {
    let loader_data = parsed.get("loaderData")?.as_object()?;

    let page = match loader_data.get(expected_key) {
        Some(page) => page,
        None => loader_data
            .values()
            .find(|candidate| has_audio_with_lyrics(candidate))?,
    };

    let option = page.get("audioWithLyricsOption").filter(|v| v.is_object())?;
    let track_info = option.get("trackInfo")?;

    let title = track_info.get("name")?.as_str()?.to_string();
    let artists = track_info
        .get("artists")?
        .as_array()?
        .iter()
        .filter_map(|artist| artist.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    let album = track_info.get("album")?.get("name")?.as_str()?.to_string();
    let cover_url = option.get("coverURL")?.as_str()?.to_string();
    let audio_url = option.get("url")?.as_str()?.to_string();

    let lyrics_data: Lyrics = option
        .get("lyrics")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    Some(SongInfo {
        title,
        artists,
        album,
        cover_url,
        audio_url,
        lyrics: format_lyrics(&lyrics_data),
        contributors: extract_contributors(&lyrics_data),
        track_info: Some(track_info.clone()),
        bit_rates: track_info.get("bit_rates").cloned(),
        label_info: track_info.get("label_info").cloned(),
        stats: track_info.get("stats").cloned(),
        colors: track_info.get("colors").cloned(),
        album_info: track_info.get("album").cloned(),
        artist_details: track_info.get("artists").cloned(),
        comments: option.get("commentsStruct").cloned(),
        artist_tracks: option.get("artistTracks").cloned(),
        related_tracks: option.get("relatedTracks").cloned(),
        chart_tracks: option.get("chartTracks").cloned(),
        anchor: option.get("anchor").cloned(),
    })
}

/// Capability test for the structural fallback: does this loader-data
/// value carry an audio-with-lyrics sub-object?
fn has_audio_with_lyrics(candidate: &Value) -> bool {
    candidate
        .get("audioWithLyricsOption")
        .is_some_and(Value::is_object)
}

/// Format a millisecond offset as an LRC time tag `[MM:SS.ss]`.
///
/// Minutes are zero-padded to two digits with no upper bound; seconds
/// within the minute are rendered to two decimals, zero-padded to width 5.
/// Negative inputs clamp to zero.
pub fn format_lrc_time(milliseconds: i64) -> String {
    let ms = milliseconds.max(0);
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) as f64 / 1000.0;
    format!("[{minutes:02}:{seconds:05.2}]")
}

/// Derive the two lyric text blocks from timed sentences.
///
/// Only sung lines (not `"lrc"` metadata) with at least one word are kept;
/// ordering follows the input. Empty input yields empty blocks.
pub fn format_lyrics(lyrics: &Lyrics) -> FormattedLyrics {
    let mut lrc_lines = Vec::new();
    let mut word_lrc_lines = Vec::new();

    let sung = lyrics
        .sentences
        .iter()
        .filter(|s| s.kind.as_deref() != Some("lrc") && !s.words.is_empty());

    for sentence in sung {
        let time_tag = format_lrc_time(sentence.start_ms);
        lrc_lines.push(format!("{time_tag}{}", sentence.text));

        let word_tags: String = sentence
            .words
            .iter()
            .map(|w| format!("<{},{}>{}", w.start_ms, w.end_ms, w.text))
            .collect();
        word_lrc_lines.push(format!("{time_tag}{word_tags}"));
    }

    FormattedLyrics {
        lrc: lrc_lines.join("\n"),
        word_lrc: word_lrc_lines.join("\n"),
    }
}

/// Pull lyricist/composer names out of the metadata lyric lines.
///
/// Lines marked `"lrc"` are matched against the bilingual credit prefixes;
/// the captured tail is split into names, trimmed, and de-duplicated
/// preserving first-seen order. Returns `None` when nothing matched, and
/// omits either field when its list is empty.
pub fn extract_contributors(lyrics: &Lyrics) -> Option<Contributors> {
    let meta_lines: Vec<&str> = lyrics
        .sentences
        .iter()
        .filter(|s| s.kind.as_deref() == Some("lrc"))
        .map(|s| s.text.trim())
        .collect();
    if meta_lines.is_empty() {
        return None;
    }

    let mut lyricists = Vec::new();
    let mut composers = Vec::new();

    for line in meta_lines {
        if let Some(caps) = LYRICIST_RE.captures(line)
            && let Some(names) = caps.get(1)
        {
            push_names(&mut lyricists, names.as_str());
        }
        if let Some(caps) = COMPOSER_RE.captures(line)
            && let Some(names) = caps.get(1)
        {
            push_names(&mut composers, names.as_str());
        }
    }

    if lyricists.is_empty() && composers.is_empty() {
        return None;
    }
    Some(Contributors {
        lyricists: (!lyricists.is_empty()).then_some(lyricists),
        composers: (!composers.is_empty()).then_some(composers),
    })
}

/// Split a captured name list and append the unseen names in order.
fn push_names(out: &mut Vec<String>, captured: &str) {
    for name in NAME_SPLIT_RE.split(captured) {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
}
