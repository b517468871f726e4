//! Interactive edits on a working document.
//!
//! Every edit stamps `modification_date`, the way the editor form does.

use chrono::NaiveDate;
use indexmap::IndexSet;

use super::document::{format_date, BookEntry, CharacterDocument};
use super::field::{CardField, FieldValue};
use crate::error::{CardError, Result};

impl CharacterDocument {
    /// Replace a field's value.
    pub fn update_field(
        &mut self,
        field: CardField,
        value: FieldValue,
        today: NaiveDate,
    ) -> Result<()> {
        self.data.set(field, value)?;
        self.touch(today);
        Ok(())
    }

    /// Insert a generated value. Tags are merged into the existing list
    /// without duplicates; every other field is replaced.
    pub fn insert_field(
        &mut self,
        field: CardField,
        value: FieldValue,
        today: NaiveDate,
    ) -> Result<()> {
        match (field, value) {
            (CardField::Tags, FieldValue::List(new_tags)) => {
                let merged = merge_tags(&self.data.tags, new_tags);
                self.update_field(CardField::Tags, FieldValue::List(merged), today)
            }
            (field, value) => self.update_field(field, value, today),
        }
    }

    /// Append a lore-book entry from comma-separated keys and body text.
    pub fn add_book_entry(&mut self, keys: &str, content: &str, today: NaiveDate) -> Result<()> {
        let keys = split_keys(keys);
        let content = content.trim();

        if keys.is_empty() || content.is_empty() {
            return Err(CardError::InvalidCard(
                "A lore-book entry needs at least one key and some content".to_string(),
            ));
        }

        self.push_book_entry(BookEntry::new(keys, content), today);
        Ok(())
    }

    /// Append an already-built lore-book entry.
    pub fn push_book_entry(&mut self, entry: BookEntry, today: NaiveDate) {
        self.data.character_book.entries.push(entry);
        self.touch(today);
    }

    /// Remove the lore-book entry at `index`.
    pub fn remove_book_entry(&mut self, index: usize, today: NaiveDate) -> Result<BookEntry> {
        let entries = &mut self.data.character_book.entries;
        if index >= entries.len() {
            return Err(CardError::InvalidCard(format!(
                "No lore-book entry at index {} ({} entries)",
                index,
                entries.len()
            )));
        }
        let removed = entries.remove(index);
        self.touch(today);
        Ok(removed)
    }

    /// Drop every lore-book entry.
    pub fn clear_book(&mut self, today: NaiveDate) {
        self.data.character_book.entries.clear();
        self.touch(today);
    }

    fn touch(&mut self, today: NaiveDate) {
        self.data.modification_date = format_date(today);
    }
}

/// Split comma-separated keys, trimming and dropping empties.
pub fn split_keys(keys: &str) -> Vec<String> {
    keys.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Existing tags followed by new ones, first occurrence wins.
fn merge_tags(existing: &[String], new_tags: Vec<String>) -> Vec<String> {
    existing
        .iter()
        .cloned()
        .chain(new_tags)
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_update_field_stamps_modification_date() {
        let mut doc = CharacterDocument::new_blank(day(1));
        doc.update_field(CardField::Name, FieldValue::Text("Mira".into()), day(9))
            .unwrap();

        assert_eq!(doc.data.name, "Mira");
        assert_eq!(doc.data.creation_date, "2024-05-01");
        assert_eq!(doc.data.modification_date, "2024-05-09");
    }

    #[test]
    fn test_failed_update_leaves_date() {
        let mut doc = CharacterDocument::new_blank(day(1));
        assert!(doc
            .update_field(CardField::Name, FieldValue::List(vec![]), day(9))
            .is_err());
        assert_eq!(doc.data.modification_date, "2024-05-01");
    }

    #[test]
    fn test_insert_tags_merges_without_duplicates() {
        let mut doc = CharacterDocument::new_blank(day(1));
        doc.data.tags = vec!["fantasy".into(), "elf".into()];

        doc.insert_field(
            CardField::Tags,
            FieldValue::List(vec!["elf".into(), "mage".into(), "mage".into()]),
            day(2),
        )
        .unwrap();

        assert_eq!(doc.data.tags, vec!["fantasy", "elf", "mage"]);
    }

    #[test]
    fn test_insert_text_replaces() {
        let mut doc = CharacterDocument::new_blank(day(1));
        doc.data.description = "old".into();
        doc.insert_field(CardField::Description, FieldValue::Text("new".into()), day(2))
            .unwrap();
        assert_eq!(doc.data.description, "new");
    }

    #[test]
    fn test_add_book_entry() {
        let mut doc = CharacterDocument::new_blank(day(1));
        doc.add_book_entry(" castle , ,moat ", "  The old keep.  ", day(3))
            .unwrap();

        let entry = &doc.data.character_book.entries[0];
        assert_eq!(entry.keys, vec!["castle", "moat"]);
        assert_eq!(entry.content, "The old keep.");
        assert_eq!(entry.insertion_order, 100);
        assert!(entry.enabled);
        assert_eq!(doc.data.modification_date, "2024-05-03");
    }

    #[test]
    fn test_add_book_entry_requires_keys_and_content() {
        let mut doc = CharacterDocument::new_blank(day(1));
        assert!(doc.add_book_entry(" , ", "content", day(2)).is_err());
        assert!(doc.add_book_entry("key", "   ", day(2)).is_err());
        assert!(doc.data.character_book.entries.is_empty());
    }

    #[test]
    fn test_remove_and_clear_book() {
        let mut doc = CharacterDocument::new_blank(day(1));
        doc.add_book_entry("a", "first", day(1)).unwrap();
        doc.add_book_entry("b", "second", day(1)).unwrap();

        let removed = doc.remove_book_entry(0, day(2)).unwrap();
        assert_eq!(removed.content, "first");
        assert_eq!(doc.data.character_book.entries.len(), 1);
        assert!(doc.remove_book_entry(5, day(2)).is_err());

        doc.clear_book(day(4));
        assert!(doc.data.character_book.entries.is_empty());
        assert_eq!(doc.data.modification_date, "2024-05-04");
    }
}
