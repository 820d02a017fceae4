//! JSON text isolation.
//!
//! Given the body of the hydration script, cuts out exactly one
//! syntactically balanced JSON object. The primary path is a small state
//! machine walking the text after the assignment operator; the secondary
//! path is a best-effort trim used only when the walk fails.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading `_ROUTER_DATA = ` / `window._ROUTER_DATA = ` assignment prefix,
/// stripped on the heuristic fallback path.
static ASSIGN_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:window\.)?_ROUTER_DATA\s*=\s*").expect("assign prefix regex")
});

/// Which isolation path produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolateStrategy {
    /// Depth-counting walk from the first `{` after the assignment.
    BalancedBraces,
    /// Heuristic: strip assignment prefix and trailing `;`, truncate to
    /// the last `}`. Correct only when nothing brace-like follows the
    /// object; callers should treat this path as best-effort.
    TrimToLastBrace,
}

impl IsolateStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            IsolateStrategy::BalancedBraces => "balanced-brace-after-equals",
            IsolateStrategy::TrimToLastBrace => "trim-to-last-brace",
        }
    }
}

/// Isolate one JSON object from a script body.
///
/// The returned text is brace-balanced on the `BalancedBraces` path; it may
/// still fail to parse as JSON, which is the caller's distinct failure mode.
/// `None` means no object boundary could be found at all.
pub fn isolate_json(script: &str) -> Option<(&str, IsolateStrategy)> {
    if let Some(eq) = script.find('=')
        && let Some(region) = balanced_region(script, eq + 1)
    {
        return Some((region, IsolateStrategy::BalancedBraces));
    }

    let mut rest = script;
    if let Some(m) = ASSIGN_PREFIX_RE.find(rest) {
        rest = &rest[m.end()..];
    }
    let mut rest = rest.trim();
    if let Some(stripped) = rest.strip_suffix(';') {
        rest = stripped;
    }
    let last_brace = rest.rfind('}')?;
    Some((&rest[..=last_brace], IsolateStrategy::TrimToLastBrace))
}

/// Return the shortest brace-balanced region starting at the first `{` at
/// or after `from` (a byte offset).
///
/// Depth counting is suppressed inside single- or double-quoted string
/// literals, with standard escape-parity handling so `\"` does not close a
/// string but `\\"` does.
pub fn balanced_region(source: &str, from: usize) -> Option<&str> {
    let start = from + source.get(from..)?.find('{')?;
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if let Some(quote) = in_string {
            if !escaped && b == quote {
                in_string = None;
            }
            escaped = !escaped && b == b'\\';
            continue;
        }
        match b {
            b'"' | b'\'' => {
                in_string = Some(b);
                escaped = false;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&source[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
