//! API handlers.

pub mod audio;
pub mod song;

pub use audio::proxy_audio;
pub use song::get_song;
