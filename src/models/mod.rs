//! Data models for extracted song pages.

pub mod song;

pub use song::{Contributors, FormattedLyrics, LyricSentence, LyricWord, Lyrics, SongInfo};
