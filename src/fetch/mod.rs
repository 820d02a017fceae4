//! Upstream page and audio fetching.
//!
//! Thin wrapper over a shared `reqwest::Client` sending browser-like
//! headers. A non-success page status or transport failure is a
//! `FetchError`; nothing is retried here, that policy belongs to callers.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, RANGE, REFERER, USER_AGENT};
use thiserror::Error;

/// Song pages live under this path, keyed by track id.
const SONG_PAGE_BASE: &str = "https://www.douyin.com/qishui/song";
const PAGE_REFERER: &str = "https://www.douyin.com/";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Upstream fetch failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
}

/// Shared HTTP client for song pages and the audio relay.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    http: reqwest::Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { http })
    }

    /// Page URL for a track id.
    pub fn song_page_url(id: &str) -> String {
        format!("{SONG_PAGE_BASE}/{}", urlencoding::encode(id))
    }

    /// Fetch the song page HTML for a track id.
    ///
    /// Any non-success status is an error; the caller decides whether that
    /// surfaces as "upstream unavailable" or gets another id tried.
    pub async fn fetch_song_page(&self, id: &str) -> Result<String, FetchError> {
        let url = Self::song_page_url(id);
        tracing::debug!(%url, "fetching song page");

        let response = self
            .http
            .get(&url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9,en;q=0.8")
            .header("Upgrade-Insecure-Requests", "1")
            .header("DNT", "1")
            .send()
            .await
            .map_err(|source| FetchError::Request { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }
        response
            .text()
            .await
            .map_err(|source| FetchError::Request { url, source })
    }

    /// Open an upstream audio stream, forwarding an optional `Range`
    /// header. The response is returned as-is (status included) so the
    /// relay can mirror partial-content semantics without inspecting it.
    pub async fn fetch_audio(
        &self,
        url: &str,
        range: Option<&str>,
    ) -> Result<reqwest::Response, FetchError> {
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, "*/*")
            .header(REFERER, PAGE_REFERER);
        if let Some(range) = range {
            request = request.header(RANGE, range);
        }
        request.send().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_page_url() {
        assert_eq!(
            PageFetcher::song_page_url("7439000000000000000"),
            "https://www.douyin.com/qishui/song/7439000000000000000"
        );
    }

    #[test]
    fn test_song_page_url_encodes_id() {
        assert_eq!(
            PageFetcher::song_page_url("a/b c"),
            "https://www.douyin.com/qishui/song/a%2Fb%20c"
        );
    }
}
