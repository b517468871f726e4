//! Inspect command - show what a PNG carries and which strategy finds it.

use std::path::PathBuf;

use colored::Colorize;
use cardforge::png::text_chunks;
use cardforge::{ExtractorConfig, Strategy};

use super::{read_file, CommandResult};

pub fn run(file: PathBuf, json_output: bool) -> CommandResult {
    let bytes = read_file(&file)?;
    let config = ExtractorConfig::default();
    let chunks = text_chunks(&bytes);

    let results: Vec<(Strategy, bool)> = Strategy::ORDER
        .iter()
        .map(|&strategy| (strategy, strategy.run(&bytes, &config).is_some()))
        .collect();
    let winner = results.iter().find(|(_, hit)| *hit).map(|(s, _)| *s);

    if json_output {
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "size_bytes": bytes.len(),
            "png_signature": cardforge::png::has_png_signature(&bytes),
            "text_chunks": chunks.iter().map(|c| serde_json::json!({
                "keyword": c.keyword,
                "offset": c.offset,
                "length": c.payload_end - c.payload_start,
                "card_keyword": config.is_card_keyword(&c.keyword),
            })).collect::<Vec<_>>(),
            "strategies": results.iter().map(|(s, hit)| serde_json::json!({
                "strategy": s,
                "found": hit,
            })).collect::<Vec<_>>(),
            "recovered_by": winner,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {}", "Inspecting".cyan().bold(), file.display());
    if !cardforge::png::has_png_signature(&bytes) {
        println!("{}", "  (no PNG signature)".yellow());
    }
    println!();

    println!("{}", "Text chunks:".yellow().bold());
    if chunks.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for chunk in &chunks {
        let keyword = if config.is_card_keyword(&chunk.keyword) {
            chunk.keyword.green().bold()
        } else {
            chunk.keyword.white()
        };
        println!(
            "  {:>8}  {}  ({} bytes)",
            chunk.offset,
            keyword,
            chunk.payload_end - chunk.payload_start
        );
    }
    println!();

    println!("{}", "Strategies:".yellow().bold());
    for (strategy, hit) in &results {
        let mark = if *hit { "found".green() } else { "miss".red() };
        println!("  {:<14} {}", strategy.to_string(), mark);
    }
    println!();

    match winner {
        Some(strategy) => println!(
            "{} {}",
            "Card recovered via".green().bold(),
            strategy.to_string().cyan()
        ),
        None => println!("{}", "No character data found in PNG".red().bold()),
    }

    Ok(())
}
