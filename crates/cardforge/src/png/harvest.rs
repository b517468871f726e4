//! Base64 harvester: card JSON base64-encoded somewhere in the file.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::decode::{decode_base64_text, lossy_text, parse_object};
use super::extract::ExtractorConfig;
use crate::error::Result;

/// Shortest base64 run worth decoding.
pub const DEFAULT_MIN_BASE64_RUN: usize = 100;

/// Substrings a decoded run must contain before it is parsed.
const CARD_MARKERS: [&str; 3] = ["\"name\"", "\"char_name\"", "chara_card"];

static DEFAULT_RUN_PATTERN: Lazy<Regex> =
    Lazy::new(|| run_pattern(DEFAULT_MIN_BASE64_RUN).unwrap());

fn run_pattern(min_run: usize) -> Result<Regex> {
    Ok(Regex::new(&format!("[A-Za-z0-9+/]{{{},}}={{0,2}}", min_run))?)
}

/// Decode long base64 runs in the file text and return the first one that
/// looks like card data and parses as a JSON object.
pub fn harvest_base64(buf: &[u8], config: &ExtractorConfig) -> Option<Value> {
    let custom;
    let pattern = if config.min_base64_run == DEFAULT_MIN_BASE64_RUN {
        &*DEFAULT_RUN_PATTERN
    } else {
        custom = match run_pattern(config.min_base64_run) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!(error = %e, min_run = config.min_base64_run, "bad base64 run length");
                return None;
            }
        };
        &custom
    };

    let text = lossy_text(buf);
    let mut candidates = 0usize;

    let found = pattern.find_iter(&text).find_map(|run| {
        candidates += 1;
        decode_run(run.as_str())
    });

    debug!(candidates, recovered = found.is_some(), "base64 harvest finished");
    found
}

fn decode_run(run: &str) -> Option<Value> {
    let decoded = decode_base64_text(run)?;
    let text = lossy_text(&decoded);

    if !CARD_MARKERS.iter().any(|marker| text.contains(marker)) {
        trace!(len = run.len(), "base64 run does not look like a card");
        return None;
    }
    parse_object(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    fn padded_card(marker_field: &str) -> String {
        let json = format!(
            r#"{{"{}":"Harvested","description":"{}"}}"#,
            marker_field,
            "long enough to cross the minimum run length ".repeat(3)
        );
        STANDARD.encode(json)
    }

    #[test]
    fn test_harvest_char_name() {
        let mut buf = b"\x89PNG\x00\x01IDAT\x00".to_vec();
        buf.extend_from_slice(padded_card("char_name").as_bytes());
        buf.extend_from_slice(b"\x00\xFFtail");

        let value = harvest_base64(&buf, &ExtractorConfig::default()).unwrap();
        assert_eq!(value["char_name"], "Harvested");
    }

    #[test]
    fn test_harvest_skips_runs_without_markers() {
        let noise = STANDARD.encode("x".repeat(200));
        let mut buf = noise.into_bytes();
        buf.push(b'\n');
        buf.extend_from_slice(padded_card("name").as_bytes());

        let value = harvest_base64(&buf, &ExtractorConfig::default()).unwrap();
        assert_eq!(value["name"], "Harvested");
    }

    #[test]
    fn test_harvest_ignores_short_runs() {
        let short = STANDARD.encode(r#"{"name":"A"}"#);
        assert!(short.len() < DEFAULT_MIN_BASE64_RUN);
        assert!(harvest_base64(short.as_bytes(), &ExtractorConfig::default()).is_none());

        let config = ExtractorConfig {
            min_base64_run: 8,
            ..ExtractorConfig::default()
        };
        let value = harvest_base64(short.as_bytes(), &config).unwrap();
        assert_eq!(value["name"], "A");
    }

    #[test]
    fn test_harvest_marker_but_invalid_json() {
        let encoded = STANDARD.encode(format!(r#""name": {}"#, "z".repeat(120)));
        assert!(harvest_base64(encoded.as_bytes(), &ExtractorConfig::default()).is_none());
    }
}
