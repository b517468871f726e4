//! Tolerant payload decoding shared by the strategies.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde_json::Value;
use tracing::trace;

/// Base64 the way browsers' `atob` accepts it: padding optional, stray
/// trailing bits ignored.
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode base64 text, ignoring ASCII whitespace.
pub(crate) fn decode_base64_text(text: &str) -> Option<Vec<u8>> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return None;
    }
    match FORGIVING.decode(compact.as_bytes()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            trace!(error = %e, "not base64");
            None
        }
    }
}

/// Parse `text` as JSON, accepting only objects. A leading byte-order
/// mark is skipped.
pub(crate) fn parse_object(text: &str) -> Option<Value> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => {
            trace!("JSON parsed but is not an object");
            None
        }
        Err(e) => {
            trace!(error = %e, "candidate is not valid JSON");
            None
        }
    }
}

/// Lossy UTF-8: invalid sequences become U+FFFD instead of failing.
pub(crate) fn lossy_text(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_accepts_missing_padding_and_whitespace() {
        assert_eq!(decode_base64_text("aGk").unwrap(), b"hi");
        assert_eq!(decode_base64_text("aG\nk=").unwrap(), b"hi");
        assert!(decode_base64_text("not base64!").is_none());
        assert!(decode_base64_text("  ").is_none());
    }

    #[test]
    fn test_parse_object_only() {
        assert!(parse_object(r#"{"name":"A"}"#).is_some());
        assert!(parse_object("[1,2]").is_none());
        assert!(parse_object("{broken").is_none());
        assert_eq!(parse_object("\u{FEFF}{\"name\":\"Bom\"}").unwrap()["name"], "Bom");
    }
}
