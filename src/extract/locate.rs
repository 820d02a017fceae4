//! Script tag location.
//!
//! Finds the one `<script>` element most likely to carry the page's
//! hydration data: first by a known attribute marker, then by scanning
//! every script body for a known global-assignment identifier.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker carried by the hydration script on current pages.
static MARKER_SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script[^>]*data-script-src="modern-inline"[^>]*>(.*?)</script>"#)
        .expect("marker script regex")
});

/// Any complete `<script>...</script>` element.
static ANY_SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("script regex")
});

/// Global assignments known to wrap router/loader hydration data.
static DATA_ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:_ROUTER_DATA|loaderData|window\._ROUTER_DATA)\s*=")
        .expect("data assignment regex")
});

/// Opening script tags, counted for diagnostics only.
static SCRIPT_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<script\b").expect("script open regex"));

/// Result of scanning a document for the hydration script.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedScript<'a> {
    /// Inner text of the selected script element, untrimmed.
    pub body: &'a str,
    /// Which strategy selected it.
    pub strategy: LocateStrategy,
}

/// Which of the two location strategies matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    /// Script carrying the `modern-inline` attribute marker.
    Marker,
    /// First script whose body contains a known data assignment.
    AssignmentScan,
}

/// Scan raw HTML for the hydration data script.
///
/// Returns the first qualifying script body (document order wins) together
/// with the total number of `<script` occurrences seen, which callers may
/// surface in diagnostics. `None` for the body is a normal terminal
/// outcome, not an error.
pub fn locate_data_script(html: &str) -> (Option<LocatedScript<'_>>, usize) {
    let script_count = SCRIPT_OPEN_RE.find_iter(html).count();

    if let Some(caps) = MARKER_SCRIPT_RE.captures(html)
        && let Some(body) = caps.get(1)
    {
        return (
            Some(LocatedScript {
                body: body.as_str(),
                strategy: LocateStrategy::Marker,
            }),
            script_count,
        );
    }

    tracing::debug!("marker script not found, scanning all scripts");
    for caps in ANY_SCRIPT_RE.captures_iter(html) {
        if let Some(body) = caps.get(1)
            && DATA_ASSIGNMENT_RE.is_match(body.as_str())
        {
            return (
                Some(LocatedScript {
                    body: body.as_str(),
                    strategy: LocateStrategy::AssignmentScan,
                }),
                script_count,
            );
        }
    }

    (None, script_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_script_wins() {
        let html = concat!(
            "<html><script>var x = 1;</script>",
            r#"<script data-script-src="modern-inline">_ROUTER_DATA = {"a":1};</script>"#,
            "<script>other()</script></html>"
        );
        let (found, count) = locate_data_script(html);
        let script = found.unwrap();
        assert_eq!(script.strategy, LocateStrategy::Marker);
        assert_eq!(script.body, r#"_ROUTER_DATA = {"a":1};"#);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_first_marker_occurrence_wins() {
        let html = concat!(
            r#"<script data-script-src="modern-inline">first = {};</script>"#,
            r#"<script data-script-src="modern-inline">second = {};</script>"#,
        );
        let (found, _) = locate_data_script(html);
        assert_eq!(found.unwrap().body, "first = {};");
    }

    #[test]
    fn test_assignment_scan_fallback() {
        let html = concat!(
            "<script>analytics();</script>",
            r#"<script>window._ROUTER_DATA = {"loaderData":{}};</script>"#,
        );
        let (found, count) = locate_data_script(html);
        let script = found.unwrap();
        assert_eq!(script.strategy, LocateStrategy::AssignmentScan);
        assert!(script.body.contains("loaderData"));
        assert_eq!(count, 2);
    }

    #[test]
    fn test_loader_data_pattern_matches() {
        let html = r#"<script>self.loaderData = {"k":{}};</script>"#;
        let (found, _) = locate_data_script(html);
        assert!(found.is_some());
    }

    #[test]
    fn test_no_qualifying_script_reports_count() {
        let html = "<script>a()</script><script>b()</script><p>no data</p>";
        let (found, count) = locate_data_script(html);
        assert!(found.is_none());
        assert!(count >= 2);
    }

    #[test]
    fn test_empty_document() {
        let (found, count) = locate_data_script("");
        assert!(found.is_none());
        assert_eq!(count, 0);
    }
}
