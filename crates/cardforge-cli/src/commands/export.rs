//! Export command - write normalized JSON or embed into a PNG.

use std::path::PathBuf;

use colored::Colorize;
use cardforge::{Exporter, Importer};

use super::{read_file, sibling_path, CommandResult};

pub fn run(card: PathBuf, image: Option<PathBuf>, output: Option<PathBuf>) -> CommandResult {
    let imported = Importer::new().import_file(&card)?;
    let exporter = Exporter::new();

    let output_path = match image {
        Some(image) => {
            let png = read_file(&image)?;
            let path = output.unwrap_or_else(|| sibling_path(&image, "png"));
            exporter.save_png(&imported.document, &png, &path)?;
            path
        }
        None => {
            let path = output.unwrap_or_else(|| sibling_path(&card, "json"));
            exporter.save_json(&imported.document, &path)?;
            path
        }
    };

    println!(
        "{} {} {}",
        "Exported".green().bold(),
        imported.document.display_name().white().bold(),
        format!("to {}", output_path.display()).green()
    );
    Ok(())
}
