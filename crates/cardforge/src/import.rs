//! Card import: `.json` files directly, `.png` files through recovery.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::card::{normalize_at, CharacterDocument, SchemaVersion};
use crate::error::{CardError, Result};
use crate::png::{Extractor, ExtractorConfig, Strategy};
use crate::portrait::Portrait;

/// Kind of card file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Json,
    Png,
}

impl FileKind {
    /// Classify a path by its extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(FileKind::Json),
            "png" => Ok(FileKind::Png),
            _ => Err(CardError::UnsupportedFileType(
                path.file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            )),
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Json => write!(f, "json"),
            FileKind::Png => write!(f, "png"),
        }
    }
}

/// Import configuration.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    /// PNG recovery configuration.
    pub extractor: ExtractorConfig,
    /// Refuse files larger than this many bytes (None = no limit).
    pub max_file_size: Option<u64>,
}

/// Where an imported card came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Container format.
    pub format: FileKind,
    /// Schema generation of the source card.
    pub schema: SchemaVersion,
    /// PNG recovery strategy that found the card (None for JSON files).
    pub strategy: Option<Strategy>,
    /// When the import happened.
    pub imported_at: DateTime<Utc>,
}

/// A successfully imported card.
#[derive(Debug, Clone)]
pub struct ImportedCard {
    /// The normalized document.
    pub document: CharacterDocument,
    /// The PNG itself, for PNG imports.
    pub portrait: Option<Portrait>,
    /// Provenance of the card.
    pub source: SourceMetadata,
}

/// Imports character cards from files or in-memory buffers.
#[derive(Debug, Clone, Default)]
pub struct Importer {
    config: ImportConfig,
    extractor: Extractor,
}

impl Importer {
    /// Create an importer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an importer with custom configuration.
    pub fn with_config(config: ImportConfig) -> Self {
        let extractor = Extractor::with_config(config.extractor.clone());
        Self { config, extractor }
    }

    /// Read and import a card file.
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportedCard> {
        let path = path.as_ref();
        // Reject by extension before touching the file.
        FileKind::from_path(path)?;

        let mut file = File::open(path).map_err(|e| CardError::io(path, e))?;
        let size_bytes = file.metadata().map_err(|e| CardError::io(path, e))?.len();
        self.check_size(path, size_bytes)?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| CardError::io(path, e))?;

        self.import_bytes(path, contents)
    }

    /// Import a card from bytes; `path` only supplies the name and extension.
    pub fn import_bytes(&self, path: impl AsRef<Path>, bytes: Vec<u8>) -> Result<ImportedCard> {
        self.import_bytes_at(path, bytes, Utc::now().date_naive())
    }

    /// Like [`import_bytes`](Self::import_bytes) with an explicit date for
    /// the normalizer's date stamps.
    pub fn import_bytes_at(
        &self,
        path: impl AsRef<Path>,
        bytes: Vec<u8>,
        today: NaiveDate,
    ) -> Result<ImportedCard> {
        let path = path.as_ref();
        let kind = FileKind::from_path(path)?;
        self.check_size(path, bytes.len() as u64)?;

        let (raw, strategy) = match kind {
            FileKind::Json => (parse_json_card(path, &bytes)?, None),
            FileKind::Png => {
                let extraction = self
                    .extractor
                    .extract(&bytes)
                    .ok_or(CardError::NoEmbeddedData)?;
                (extraction.value, Some(extraction.strategy))
            }
        };

        let schema = SchemaVersion::detect(&raw);
        let document = normalize_at(&raw, today)?;
        let source = SourceMetadata {
            file: path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            hash: sha256_hex(&bytes),
            size_bytes: bytes.len() as u64,
            format: kind,
            schema,
            strategy,
            imported_at: Utc::now(),
        };
        let portrait = match kind {
            FileKind::Png => Some(Portrait::from_png(bytes)),
            FileKind::Json => None,
        };

        info!(
            file = %source.file,
            name = %document.display_name(),
            schema = %schema,
            strategy = ?strategy,
            "imported character card"
        );

        Ok(ImportedCard {
            document,
            portrait,
            source,
        })
    }

    /// The PNG as a portrait, whether or not it carries a card.
    pub fn portrait(&self, bytes: &[u8]) -> Portrait {
        Portrait::from_png(bytes.to_vec())
    }

    fn check_size(&self, path: &Path, size: u64) -> Result<()> {
        match self.config.max_file_size {
            Some(max) if size > max => Err(CardError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("file is {} bytes, limit is {}", size, max),
                ),
            )),
            _ => Ok(()),
        }
    }
}

/// Parse a `.json` card, skipping a leading byte-order mark. No PNG
/// recovery is attempted on failure.
fn parse_json_card(path: &Path, bytes: &[u8]) -> Result<Value> {
    let raw = String::from_utf8_lossy(bytes);
    let text = raw.strip_prefix('\u{FEFF}').unwrap_or(&raw);
    debug!(path = %path.display(), len = text.len(), "parsing JSON card");
    serde_json::from_str(text).map_err(|source| CardError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}
