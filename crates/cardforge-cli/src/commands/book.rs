//! Book command - add, remove or clear lore-book entries.

use std::path::PathBuf;

use colored::Colorize;

use super::{open_workspace, save_in_place, CommandResult};

pub fn add(card: PathBuf, keys: String, content: String) -> CommandResult {
    let mut workspace = open_workspace(&card)?;
    workspace.add_book_entry(&keys, &content)?;
    save_in_place(&card, &workspace)?;

    let count = workspace.document.data.character_book.entries.len();
    println!("{} ({} entries)", "Entry added".green().bold(), count);
    Ok(())
}

pub fn remove(card: PathBuf, index: usize) -> CommandResult {
    let mut workspace = open_workspace(&card)?;
    let removed = workspace.remove_book_entry(index)?;
    save_in_place(&card, &workspace)?;

    println!(
        "{} [{}]",
        "Entry removed".green().bold(),
        removed.keys.join(", ").cyan()
    );
    Ok(())
}

pub fn clear(card: PathBuf) -> CommandResult {
    let mut workspace = open_workspace(&card)?;
    workspace.clear_book();
    save_in_place(&card, &workspace)?;

    println!("{}", "Lore book cleared".green().bold());
    Ok(())
}
