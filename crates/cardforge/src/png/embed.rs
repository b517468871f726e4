//! Writing text chunks back into a PNG.

use flate2::Crc;
use tracing::debug;

use super::{has_png_signature, PNG_SIGNATURE, TEXT_CHUNK_TYPE};
use crate::error::{CardError, Result};

/// Longest keyword a `tEXt` chunk allows.
const MAX_KEYWORD_LEN: usize = 79;

/// Serialize one chunk: length, type, data, CRC-32 over type and data.
pub fn encode_chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut crc = Crc::new();
    crc.update(kind);
    crc.update(data);

    let mut chunk = Vec::with_capacity(12 + data.len());
    chunk.extend_from_slice(&(data.len() as u32).to_be_bytes());
    chunk.extend_from_slice(kind);
    chunk.extend_from_slice(data);
    chunk.extend_from_slice(&crc.sum().to_be_bytes());
    chunk
}

/// Insert a `tEXt` chunk right before `IEND`.
///
/// Existing `tEXt` chunks whose keyword is in `replace` are dropped so the
/// file carries a single copy of the card. Chunks are walked structurally,
/// so the input must be a well-formed PNG.
pub fn embed_text_chunk(
    png: &[u8],
    keyword: &str,
    text: &str,
    replace: &[String],
) -> Result<Vec<u8>> {
    if keyword.is_empty() || keyword.len() > MAX_KEYWORD_LEN || keyword.contains('\0') {
        return Err(CardError::Config(format!(
            "Invalid tEXt keyword '{}': must be 1-{} bytes without NUL",
            keyword, MAX_KEYWORD_LEN
        )));
    }
    if !has_png_signature(png) {
        return Err(CardError::InvalidPng("missing PNG signature".to_string()));
    }

    let mut data = Vec::with_capacity(keyword.len() + 1 + text.len());
    data.extend_from_slice(keyword.as_bytes());
    data.push(0);
    data.extend_from_slice(text.as_bytes());
    let new_chunk = encode_chunk(&TEXT_CHUNK_TYPE, &data);

    let mut out = Vec::with_capacity(png.len() + new_chunk.len());
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut pos = PNG_SIGNATURE.len();
    let mut inserted = false;
    while pos + 12 <= png.len() {
        let length = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        let kind = &png[pos + 4..pos + 8];
        let end = pos
            .checked_add(12 + length)
            .filter(|&end| end <= png.len())
            .ok_or_else(|| {
                CardError::InvalidPng(format!("chunk at offset {} is truncated", pos))
            })?;

        if kind == b"IEND" {
            out.extend_from_slice(&new_chunk);
            out.extend_from_slice(&png[pos..end]);
            inserted = true;
            pos = end;
            break;
        }

        if kind == TEXT_CHUNK_TYPE {
            let body = &png[pos + 8..pos + 8 + length];
            let existing = body.split(|&b| b == 0).next().unwrap_or_default();
            if replace.iter().any(|k| k.as_bytes() == existing) {
                debug!(offset = pos, keyword = %String::from_utf8_lossy(existing), "dropping old card chunk");
                pos = end;
                continue;
            }
        }

        out.extend_from_slice(&png[pos..end]);
        pos = end;
    }

    if !inserted {
        return Err(CardError::InvalidPng("missing IEND chunk".to_string()));
    }

    // Anything after IEND is carried over untouched.
    out.extend_from_slice(&png[pos..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::text_chunks;

    fn minimal_png() -> Vec<u8> {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(encode_chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]));
        png.extend(encode_chunk(b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00]));
        png.extend(encode_chunk(b"IEND", &[]));
        png
    }

    #[test]
    fn test_iend_crc_matches_reference() {
        // Every PNG ends with this exact IEND chunk.
        assert_eq!(
            encode_chunk(b"IEND", &[]),
            vec![0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]
        );
    }

    #[test]
    fn test_embed_inserts_before_iend() {
        let png = embed_text_chunk(&minimal_png(), "chara", "e30=", &[]).unwrap();
        let chunks = text_chunks(&png);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].keyword, "chara");
        assert_eq!(chunks[0].payload(&png), Some(&b"e30="[..]));
        assert!(png.ends_with(&encode_chunk(b"IEND", &[])));
    }

    #[test]
    fn test_embed_replaces_old_card_chunks() {
        let once = embed_text_chunk(&minimal_png(), "chara", "first", &[]).unwrap();
        let with_comment = embed_text_chunk(&once, "Comment", "keep me", &[]).unwrap();
        let twice = embed_text_chunk(
            &with_comment,
            "chara",
            "second",
            &["chara".to_string(), "ccv3".to_string()],
        )
        .unwrap();

        let chunks = text_chunks(&twice);
        let keywords: Vec<_> = chunks.iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["Comment", "chara"]);
        assert_eq!(chunks[1].payload(&twice), Some(&b"second"[..]));
    }

    #[test]
    fn test_embed_rejects_non_png() {
        let err = embed_text_chunk(b"GIF89a", "chara", "x", &[]).unwrap_err();
        assert!(matches!(err, CardError::InvalidPng(_)));
    }

    #[test]
    fn test_embed_requires_iend() {
        let mut png = minimal_png();
        png.truncate(png.len() - 12);
        let err = embed_text_chunk(&png, "chara", "x", &[]).unwrap_err();
        assert!(matches!(err, CardError::InvalidPng(_)));
    }

    #[test]
    fn test_embed_rejects_bad_keyword() {
        let err = embed_text_chunk(&minimal_png(), "", "x", &[]).unwrap_err();
        assert!(matches!(err, CardError::Config(_)));
    }
}
