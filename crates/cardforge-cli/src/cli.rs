//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cardforge: character card import, recovery and editing
#[derive(Parser)]
#[command(name = "cardforge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a .json or .png card and save it as normalized JSON
    Import {
        /// Card file (.json or .png)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: <stem>.card.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the portrait as a data URI to this file
        #[arg(long, value_name = "FILE")]
        portrait: Option<PathBuf>,
    },

    /// Show PNG text chunks and which strategy recovers a card
    Inspect {
        /// PNG file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a card as normalized JSON, or embed it into a PNG
    Export {
        /// Card file (.json or .png)
        #[arg(value_name = "CARD")]
        card: PathBuf,

        /// PNG to embed the card into
        #[arg(long, value_name = "PNG")]
        image: Option<PathBuf>,

        /// Output path (default: <stem>.card.json or <stem>.card.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set one text or list field of a JSON card in place
    Set {
        /// Card JSON file
        #[arg(value_name = "CARD")]
        card: PathBuf,

        /// Field name (e.g. "description", "first_mes", "tags")
        #[arg(value_name = "FIELD")]
        field: String,

        /// New value; list fields take comma-separated items
        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Edit the lore book of a JSON card in place
    Book {
        /// Card JSON file
        #[arg(value_name = "CARD")]
        card: PathBuf,

        #[command(subcommand)]
        action: BookAction,
    },

    /// Generate a field with the configured AI provider
    Generate {
        /// Card JSON file
        #[arg(value_name = "CARD")]
        card: PathBuf,

        /// Field to fill (e.g. "personality", "tags", "character_book")
        #[arg(value_name = "FIELD")]
        field: String,

        /// Prompt sent to the model
        #[arg(short, long)]
        prompt: String,

        /// Optional system message
        #[arg(long)]
        system: Option<String>,

        /// Assist settings file
        #[arg(long, default_value = "cardforge.settings.json")]
        settings: PathBuf,

        /// Override the provider from the settings file
        #[arg(long)]
        provider: Option<ProviderChoice>,
    },
}

#[derive(Subcommand)]
pub enum BookAction {
    /// Add an entry
    Add {
        /// Comma-separated trigger keys
        keys: String,

        /// Entry content
        content: String,
    },

    /// Remove the entry at INDEX (0-based)
    Remove { index: usize },

    /// Remove every entry
    Clear,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ProviderChoice {
    /// OpenAI API (requires an API key)
    Openai,
    /// Local Ollama server
    Ollama,
    /// Local LM Studio server
    Lmstudio,
    /// Canned replies, for testing
    Mock,
}

impl From<ProviderChoice> for cardforge::assist::ProviderKind {
    fn from(choice: ProviderChoice) -> Self {
        use cardforge::assist::ProviderKind;
        match choice {
            ProviderChoice::Openai => ProviderKind::OpenAi,
            ProviderChoice::Ollama => ProviderKind::Ollama,
            ProviderChoice::Lmstudio => ProviderKind::LmStudio,
            ProviderChoice::Mock => ProviderKind::Mock,
        }
    }
}
