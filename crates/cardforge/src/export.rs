//! Export of working documents as JSON files or card-carrying PNGs.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::card::CharacterDocument;
use crate::error::{CardError, Result};
use crate::png::embed_text_chunk;

/// Keywords of chunks a previous export may have left behind.
const CARD_CHUNK_KEYWORDS: [&str; 3] = ["chara", "ccv3", "ccv2"];

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// `tEXt` keyword the card is written under.
    pub keyword: String,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            keyword: "chara".to_string(),
            pretty: true,
        }
    }
}

/// Writes documents out as `.json` files or embeds them into PNGs.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create an exporter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an exporter with custom configuration.
    pub fn with_config(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Serialize a document as JSON text.
    pub fn to_json(&self, document: &CharacterDocument) -> Result<String> {
        let json = if self.config.pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };
        Ok(json)
    }

    /// Save a document as a JSON file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use cardforge::{CharacterDocument, Exporter};
    /// # fn example(doc: &CharacterDocument) -> cardforge::Result<()> {
    /// Exporter::new().save_json(doc, "out/alice.card.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save_json(&self, document: &CharacterDocument, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json(document)?;
        write_file(path, json.as_bytes())?;

        info!(path = %path.display(), name = %document.display_name(), "exported card JSON");
        Ok(())
    }

    /// Embed a document into PNG bytes.
    ///
    /// The card is written as base64 of compact JSON into a `tEXt` chunk
    /// before `IEND`; card chunks from earlier exports are replaced.
    pub fn to_png(&self, document: &CharacterDocument, png: &[u8]) -> Result<Vec<u8>> {
        let json = serde_json::to_string(document)?;
        let payload = STANDARD.encode(json);

        let mut replace: Vec<String> = CARD_CHUNK_KEYWORDS.iter().map(|k| k.to_string()).collect();
        if !replace.contains(&self.config.keyword) {
            replace.push(self.config.keyword.clone());
        }

        embed_text_chunk(png, &self.config.keyword, &payload, &replace)
    }

    /// Embed a document into a portrait PNG and save it.
    pub fn save_png(
        &self,
        document: &CharacterDocument,
        png: &[u8],
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_png(document, png)?;
        write_file(path, &bytes)?;

        info!(
            path = %path.display(),
            name = %document.display_name(),
            size = bytes.len(),
            "exported card PNG"
        );
        Ok(())
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                CardError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(path).map_err(|e| {
        CardError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
    })?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| {
            CardError::Persistence(format!("Failed to write '{}': {}", path.display(), e))
        })
}
