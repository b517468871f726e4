//! The single working document an editing session operates on.

use std::path::Path;

use chrono::{NaiveDate, Utc};

use crate::card::{BookEntry, CardField, CharacterDocument, FieldValue};
use crate::error::Result;
use crate::import::{ImportedCard, Importer, SourceMetadata};
use crate::portrait::Portrait;

/// A working document, its portrait, and where it came from.
///
/// Imports replace all three at once and only on success; a failed import
/// leaves the workspace as it was.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub document: CharacterDocument,
    pub portrait: Option<Portrait>,
    pub source: Option<SourceMetadata>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// A workspace holding a blank document dated today.
    pub fn new() -> Self {
        Self::new_at(today())
    }

    /// A workspace holding a blank document dated `today`.
    pub fn new_at(today: NaiveDate) -> Self {
        Self {
            document: CharacterDocument::new_blank(today),
            portrait: None,
            source: None,
        }
    }

    /// Import a card file into the workspace.
    pub fn import_file(&mut self, importer: &Importer, path: impl AsRef<Path>) -> Result<()> {
        let card = importer.import_file(path)?;
        self.replace(card);
        Ok(())
    }

    /// Import a card from bytes into the workspace.
    pub fn import_bytes(
        &mut self,
        importer: &Importer,
        path: impl AsRef<Path>,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let card = importer.import_bytes(path, bytes)?;
        self.replace(card);
        Ok(())
    }

    /// Swap in an imported card. JSON imports carry no portrait and clear it.
    pub fn replace(&mut self, card: ImportedCard) {
        self.document = card.document;
        self.portrait = card.portrait;
        self.source = Some(card.source);
    }

    pub fn update_field(&mut self, field: CardField, value: FieldValue) -> Result<()> {
        self.document.update_field(field, value, today())
    }

    pub fn insert_field(&mut self, field: CardField, value: FieldValue) -> Result<()> {
        self.document.insert_field(field, value, today())
    }

    pub fn add_book_entry(&mut self, keys: &str, content: &str) -> Result<()> {
        self.document.add_book_entry(keys, content, today())
    }

    pub fn push_book_entry(&mut self, entry: BookEntry) {
        self.document.push_book_entry(entry, today())
    }

    pub fn remove_book_entry(&mut self, index: usize) -> Result<BookEntry> {
        self.document.remove_book_entry(index, today())
    }

    pub fn clear_book(&mut self) {
        self.document.clear_book(today())
    }

    pub fn set_portrait(&mut self, portrait: Portrait) {
        self.portrait = Some(portrait);
    }

    pub fn clear_portrait(&mut self) {
        self.portrait = None;
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CardError;
    use crate::png::PNG_SIGNATURE;

    #[test]
    fn test_new_is_blank_v3() {
        let ws = Workspace::new();
        assert_eq!(ws.document.spec, "chara_card_v3");
        assert!(ws.document.data.name.is_empty());
        assert!(ws.portrait.is_none());
        assert!(ws.source.is_none());
    }

    #[test]
    fn test_failed_import_leaves_workspace_untouched() {
        let importer = Importer::new();
        let mut ws = Workspace::new();
        ws.import_bytes(&importer, "a.json", br#"{"name":"Kept"}"#.to_vec())
            .unwrap();
        ws.set_portrait(Portrait::from_png(PNG_SIGNATURE.to_vec()));
        let before = ws.document.clone();

        let err = ws
            .import_bytes(&importer, "b.png", PNG_SIGNATURE.to_vec())
            .unwrap_err();
        assert!(matches!(err, CardError::NoEmbeddedData));
        assert_eq!(ws.document, before);
        assert!(ws.portrait.is_some());

        assert!(ws.import_bytes(&importer, "c.txt", Vec::new()).is_err());
        assert_eq!(ws.document, before);
    }

    #[test]
    fn test_json_import_clears_portrait() {
        let importer = Importer::new();
        let mut ws = Workspace::new();
        ws.set_portrait(Portrait::from_png(PNG_SIGNATURE.to_vec()));

        ws.import_bytes(&importer, "a.json", br#"{"name":"New"}"#.to_vec())
            .unwrap();
        assert!(ws.portrait.is_none());
        assert_eq!(ws.source.as_ref().unwrap().file, "a.json");
    }

    #[test]
    fn test_edits_go_through_document() {
        let mut ws = Workspace::new();
        ws.update_field(CardField::Name, FieldValue::Text("Vel".to_string()))
            .unwrap();
        ws.add_book_entry("forest, elves", "An old forest.").unwrap();
        assert_eq!(ws.document.data.name, "Vel");
        assert_eq!(ws.document.data.character_book.entries.len(), 1);

        ws.clear_book();
        assert!(ws.document.data.character_book.entries.is_empty());
    }
}
