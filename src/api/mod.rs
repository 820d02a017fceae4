//! HTTP API module.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::fetch::PageFetcher;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub fetcher: PageFetcher,
}

impl AppState {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }
}
