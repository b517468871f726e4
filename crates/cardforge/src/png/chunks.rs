//! Chunk scanner: card JSON stored in `tEXt` chunks.

use serde_json::Value;
use tracing::debug;

use super::decode::{decode_base64_text, lossy_text, parse_object};
use super::extract::ExtractorConfig;
use super::{PNG_SIGNATURE, TEXT_CHUNK_TYPE};

/// A `tEXt` chunk located inside a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Keyword preceding the NUL separator.
    pub keyword: String,
    /// Offset of the chunk's length field.
    pub offset: usize,
    /// First byte of the text after the keyword separator.
    pub payload_start: usize,
    /// One past the last byte of chunk data (the CRC starts here).
    pub payload_end: usize,
}

impl TextChunk {
    /// The text bytes after the keyword, or `None` if `buf` is not the
    /// buffer this chunk was found in.
    pub fn payload<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        buf.get(self.payload_start..self.payload_end)
    }
}

/// Iterator over the `tEXt` chunks of a buffer.
///
/// The scan goes byte by byte looking for a `tEXt` type tag, so damaged or
/// non-conforming files still give up their text chunks. After a tag is
/// found the cursor jumps past the chunk data and its CRC so payload bytes
/// are never read as headers. A declared length running past the end of
/// the buffer is skipped.
#[derive(Debug, Clone)]
pub struct TextChunks<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> TextChunks<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: PNG_SIGNATURE.len(),
        }
    }
}

impl Iterator for TextChunks<'_> {
    type Item = TextChunk;

    fn next(&mut self) -> Option<TextChunk> {
        let buf = self.buf;

        while self.pos + 8 < buf.len() {
            let i = self.pos;
            if buf[i + 4..i + 8] != TEXT_CHUNK_TYPE {
                self.pos += 1;
                continue;
            }

            let length = u32::from_be_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]) as usize;
            let data_start = i + 8;
            self.pos = data_start.saturating_add(length).saturating_add(4);

            let data_end = match data_start.checked_add(length) {
                Some(end) if end <= buf.len() => end,
                _ => {
                    debug!(offset = i, length, "text chunk runs past end of buffer");
                    continue;
                }
            };

            let key_end = buf[data_start..data_end]
                .iter()
                .position(|&b| b == 0)
                .map_or(data_end, |p| data_start + p);

            return Some(TextChunk {
                keyword: lossy_text(&buf[data_start..key_end]).into_owned(),
                offset: i,
                payload_start: (key_end + 1).min(data_end),
                payload_end: data_end,
            });
        }

        None
    }
}

/// All `tEXt` chunks in `buf`, in file order.
pub fn text_chunks(buf: &[u8]) -> Vec<TextChunk> {
    TextChunks::new(buf).collect()
}

/// Recover card JSON from the first recognized `tEXt` chunk that parses.
pub fn scan_text_chunks(buf: &[u8], config: &ExtractorConfig) -> Option<Value> {
    TextChunks::new(buf)
        .inspect(|chunk| debug!(offset = chunk.offset, keyword = %chunk.keyword, "found text chunk"))
        .filter(|chunk| config.is_card_keyword(&chunk.keyword))
        .find_map(|chunk| {
            let parsed = chunk.payload(buf).and_then(decode_payload);
            if parsed.is_none() {
                debug!(keyword = %chunk.keyword, "card chunk did not parse, continuing");
            }
            parsed
        })
}

/// Base64-wrapped JSON first, then the payload as plain JSON.
fn decode_payload(payload: &[u8]) -> Option<Value> {
    let text = lossy_text(payload);

    decode_base64_text(&text)
        .and_then(|decoded| parse_object(&lossy_text(&decoded)))
        .or_else(|| parse_object(&text))
}
