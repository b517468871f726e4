//! Import command - recover a card and save it as normalized JSON.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use cardforge::{Exporter, Importer};

use super::{sibling_path, CommandResult};

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    portrait_out: Option<PathBuf>,
    verbose: bool,
) -> CommandResult {
    println!("{} {}", "Importing".cyan().bold(), file.display());

    let card = Importer::new().import_file(&file)?;
    let data = &card.document.data;

    println!();
    println!("{}", "Card:".yellow().bold());
    println!("  Name:       {}", card.document.display_name().white().bold());
    println!("  Schema:     {}", card.source.schema.to_string().cyan());
    if let Some(strategy) = card.source.strategy {
        println!("  Found via:  {}", strategy.to_string().cyan());
    }
    println!("  Greetings:  {}", data.alternate_greetings.len());
    println!("  Tags:       {}", data.tags.len());
    println!("  Book:       {} entries", data.character_book.entries.len());
    if verbose {
        println!("  Hash:       {}", card.source.hash.dimmed());
        println!("  Size:       {} bytes", card.source.size_bytes);
    }

    let output_path = output.unwrap_or_else(|| sibling_path(&file, "json"));
    Exporter::new().save_json(&card.document, &output_path)?;

    if let Some(portrait_path) = portrait_out {
        match &card.portrait {
            Some(portrait) => {
                fs::write(&portrait_path, portrait.to_data_uri())?;
                println!(
                    "{} {}",
                    "Portrait written to".green(),
                    portrait_path.display()
                );
            }
            None => println!("{}", "No portrait in a JSON card".yellow()),
        }
    }

    println!();
    println!(
        "{} {}",
        "Card saved to".green().bold(),
        output_path.display()
    );

    Ok(())
}
