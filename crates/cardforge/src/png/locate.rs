//! Pattern locator: card JSON sitting as plain text somewhere in the file.

use std::collections::HashSet;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};

use super::decode::{lossy_text, parse_object};

// Anchors of a character object, most specific first.
static PROBES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#""spec"\s*:\s*"chara_card_v[123]""#).unwrap(),
        Regex::new(r#""name"\s*:\s*""#).unwrap(),
        Regex::new(r#"\{\s*"name"\s*:"#).unwrap(),
        Regex::new(r#"\{\s*"char_name"\s*:"#).unwrap(),
    ]
});

/// Find a JSON object literal around a character-looking anchor.
///
/// For each probe match the span starts at the nearest `{` at or before the
/// match and ends where [`balanced_span`] says the braces close. Spans that
/// fail to parse are skipped; all probes are tried before giving up.
pub fn locate_json(buf: &[u8]) -> Option<Value> {
    let text = lossy_text(buf);
    let mut tried = HashSet::new();

    for (index, probe) in PROBES.iter().enumerate() {
        debug!(probe = index, pattern = probe.as_str(), "trying JSON anchor");

        for found in probe.find_iter(&text) {
            let Some(start) = text[..found.start() + 1].rfind('{') else {
                continue;
            };
            // Different anchors often lead back to the same opening brace.
            if !tried.insert(start) {
                continue;
            }
            let Some(span) = balanced_span(&text, start) else {
                trace!(start, "braces never balance");
                continue;
            };
            if let Some(value) = parse_object(&text[span]) {
                debug!(probe = index, start, "recovered JSON from file text");
                return Some(value);
            }
        }
    }

    None
}

/// Byte range of the brace-balanced object opening at `start`.
///
/// Every `{` counts +1 and every `}` -1, including braces inside string
/// literals; a span unbalanced by quoted braces fails the JSON parse that
/// follows rather than producing a wrong object. Returns `None` when `start`
/// is not a `{` or the depth never returns to zero.
pub fn balanced_span(text: &str, start: usize) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth: usize = 0;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => depth -= 1,
            _ => continue,
        }
        if depth == 0 {
            return Some(start..start + offset + 1);
        }
    }

    None
}
