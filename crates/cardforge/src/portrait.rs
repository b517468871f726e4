//! Character portrait images and their data-URI form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{CardError, Result};
use crate::png::has_png_signature;

/// Portrait image bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portrait {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Portrait {
    /// Wrap PNG bytes. The bytes are kept as-is, card chunks included.
    pub fn from_png(bytes: Vec<u8>) -> Self {
        Self {
            mime: "image/png".to_string(),
            bytes,
        }
    }

    /// Whether the image is a PNG, i.e. can carry an embedded card.
    pub fn is_png(&self) -> bool {
        has_png_signature(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>` for display.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// Parse a base64 data URI.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| CardError::InvalidCard("portrait is not a data URI".to_string()))?;
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| CardError::InvalidCard("portrait data URI is not base64".to_string()))?;

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| CardError::InvalidCard(format!("portrait payload: {}", e)))?;

        Ok(Self {
            mime: mime.to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::PNG_SIGNATURE;

    #[test]
    fn test_data_uri_round_trip() {
        let portrait = Portrait::from_png(PNG_SIGNATURE.to_vec());
        let uri = portrait.to_data_uri();

        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(Portrait::from_data_uri(&uri).unwrap(), portrait);
        assert!(portrait.is_png());
    }

    #[test]
    fn test_rejects_other_uris() {
        assert!(Portrait::from_data_uri("https://example.com/a.png").is_err());
        assert!(Portrait::from_data_uri("data:image/png,rawtext").is_err());
    }
}
