//! Cardforge: character card import, recovery and editing.
//!
//! Role-play character cards travel either as `.json` files or hidden
//! inside PNG portraits. Cardforge pulls the card back out of whatever it
//! is given and normalizes it into a single V3 document model.
//!
//! # Core Principles
//!
//! - **Forgiving recovery**: a PNG is searched with three strategies before giving up
//! - **One model**: V1 flat, V2 wrapped and V3 cards all become a [`CharacterDocument`]
//! - **Atomic imports**: a failed import never touches the working document
//!
//! # Example
//!
//! ```no_run
//! use cardforge::Importer;
//!
//! let card = Importer::new().import_file("alice.png").unwrap();
//!
//! println!("Name: {}", card.document.data.name);
//! println!("Schema: {}", card.source.schema);
//! ```

pub mod assist;
pub mod card;
pub mod error;
pub mod png;

mod export;
mod import;
mod portrait;
mod workspace;

pub use card::{
    normalize, BookEntry, CardData, CardField, CharacterBook, CharacterDocument, FieldValue,
    SchemaVersion,
};
pub use error::{CardError, Result};
pub use export::{ExportConfig, Exporter};
pub use import::{FileKind, ImportConfig, ImportedCard, Importer, SourceMetadata};
pub use png::{Extraction, Extractor, ExtractorConfig, Strategy};
pub use portrait::Portrait;
pub use workspace::Workspace;
