//! Cardforge CLI - character card import, recovery and editing.

mod cli;
mod commands;

use clap::Parser;
use cli::{BookAction, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Import {
            file,
            output,
            portrait,
        } => commands::import::run(file, output, portrait, cli.verbose),

        Commands::Inspect { file, json } => commands::inspect::run(file, json),

        Commands::Export {
            card,
            image,
            output,
        } => commands::export::run(card, image, output),

        Commands::Set { card, field, value } => commands::set::run(card, field, value),

        Commands::Book { card, action } => match action {
            BookAction::Add { keys, content } => commands::book::add(card, keys, content),
            BookAction::Remove { index } => commands::book::remove(card, index),
            BookAction::Clear => commands::book::clear(card),
        },

        Commands::Generate {
            card,
            field,
            prompt,
            system,
            settings,
            provider,
        } => commands::generate::run(card, field, prompt, system, settings, provider, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` overrides `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "cardforge=debug,cardforge_cli=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
