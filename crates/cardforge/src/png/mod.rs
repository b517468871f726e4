//! Recovery of character JSON embedded in PNG files, and re-embedding.
//!
//! Three strategies run against the same byte buffer, first hit wins:
//!
//! 1. [`scan_text_chunks`] - `tEXt` chunks keyed `chara` / `ccv3` / `ccv2` / `Comment`
//! 2. [`locate_json`] - JSON object literals anywhere in the file text
//! 3. [`harvest_base64`] - long base64 runs that decode to card JSON
//!
//! None of them fail loudly; a miss is `None` and the next one gets a turn.

mod chunks;
mod decode;
mod embed;
mod extract;
mod harvest;
mod locate;

pub use chunks::{scan_text_chunks, text_chunks, TextChunk, TextChunks};
pub use embed::{embed_text_chunk, encode_chunk};
pub use extract::{Extraction, Extractor, ExtractorConfig, Strategy, DEFAULT_KEYWORDS};
pub use harvest::{harvest_base64, DEFAULT_MIN_BASE64_RUN};
pub use locate::{balanced_span, locate_json};

/// The 8-byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Chunk type carrying keyword/value text pairs.
pub const TEXT_CHUNK_TYPE: [u8; 4] = *b"tEXt";

/// Whether `buf` starts with the PNG signature.
pub fn has_png_signature(buf: &[u8]) -> bool {
    buf.starts_with(&PNG_SIGNATURE)
}
