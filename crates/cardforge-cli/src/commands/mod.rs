//! CLI command implementations.

pub mod book;
pub mod export;
pub mod generate;
pub mod import;
pub mod inspect;
pub mod set;

use std::fs;
use std::path::{Path, PathBuf};

use cardforge::{Exporter, FileKind, Importer, Workspace};
use tracing::debug;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load a card file into a fresh workspace.
pub fn open_workspace(card: &Path) -> Result<Workspace, Box<dyn std::error::Error>> {
    let mut workspace = Workspace::new();
    workspace.import_file(&Importer::new(), card)?;
    Ok(workspace)
}

/// Write an edited workspace back to where it came from. PNG cards are
/// re-embedded into their own image.
pub fn save_in_place(card: &Path, workspace: &Workspace) -> CommandResult {
    debug!(path = %card.display(), "saving card in place");
    let exporter = Exporter::new();
    match (FileKind::from_path(card)?, &workspace.portrait) {
        (FileKind::Png, Some(portrait)) => {
            exporter.save_png(&workspace.document, &portrait.bytes, card)?
        }
        _ => exporter.save_json(&workspace.document, card)?,
    }
    Ok(())
}

/// `<dir>/<stem>.card.<ext>` next to the input.
pub fn sibling_path(file: &Path, extension: &str) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}.card.{}", stem, extension))
}

pub fn read_file(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    fs::read(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e).into())
}
