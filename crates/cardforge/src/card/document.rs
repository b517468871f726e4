//! Canonical (v3) character card document.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Spec tag of the canonical card format.
pub const SPEC_V3: &str = "chara_card_v3";

/// Spec version of the canonical card format.
pub const SPEC_VERSION_V3: &str = "3.0";

/// Spec tag used by v2 cards.
pub const SPEC_V2: &str = "chara_card_v2";

/// Character version assigned when a source card has none.
pub const DEFAULT_CHARACTER_VERSION: &str = "1.0";

/// Insertion order given to lore-book entries created in the editor.
pub const DEFAULT_INSERTION_ORDER: i64 = 100;

/// Date format used for `creation_date` / `modification_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date the way cards store it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A character card in the canonical v3 shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDocument {
    /// Always [`SPEC_V3`] once normalized.
    #[serde(default, deserialize_with = "nullable")]
    pub spec: String,
    /// Always [`SPEC_VERSION_V3`] once normalized.
    #[serde(default, deserialize_with = "nullable")]
    pub spec_version: String,
    /// The card body.
    #[serde(default, deserialize_with = "nullable")]
    pub data: CardData,
}

impl CharacterDocument {
    /// An empty card, as the editor starts with.
    pub fn new_blank(today: NaiveDate) -> Self {
        let stamp = format_date(today);
        Self {
            spec: SPEC_V3.to_string(),
            spec_version: SPEC_VERSION_V3.to_string(),
            data: CardData {
                character_version: DEFAULT_CHARACTER_VERSION.to_string(),
                creation_date: stamp.clone(),
                modification_date: stamp,
                ..CardData::default()
            },
        }
    }

    /// Force the v3 discriminators.
    pub(crate) fn stamp_v3(&mut self) {
        self.spec = SPEC_V3.to_string();
        self.spec_version = SPEC_VERSION_V3.to_string();
    }

    /// Display name, falling back to a placeholder for unnamed cards.
    pub fn display_name(&self) -> &str {
        if self.data.name.is_empty() {
            "(unnamed)"
        } else {
            &self.data.name
        }
    }
}

/// The body of a character card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub personality: String,
    #[serde(default, deserialize_with = "nullable")]
    pub scenario: String,
    /// First greeting message.
    #[serde(default, deserialize_with = "nullable")]
    pub first_mes: String,
    /// Example dialogue.
    #[serde(default, deserialize_with = "nullable")]
    pub mes_example: String,
    #[serde(default, deserialize_with = "nullable")]
    pub creator_notes: String,
    #[serde(default, deserialize_with = "nullable")]
    pub system_prompt: String,
    #[serde(default, deserialize_with = "nullable")]
    pub post_history_instructions: String,
    #[serde(default, deserialize_with = "nullable")]
    pub alternate_greetings: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub character_book: CharacterBook,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub creator: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub character_version: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub creation_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub modification_date: String,
    #[serde(default, deserialize_with = "nullable")]
    pub extensions: IndexMap<String, Value>,
    /// Fields this editor does not model (`source`, `assets`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Lore book attached to a card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterBook {
    #[serde(default, deserialize_with = "nullable")]
    pub entries: Vec<BookEntry>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A keyed snippet of background text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    /// Trigger keys.
    #[serde(default, deserialize_with = "nullable")]
    pub keys: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub content: String,
    #[serde(default = "default_insertion_order", deserialize_with = "insertion_order")]
    pub insertion_order: i64,
    #[serde(default = "default_enabled", deserialize_with = "enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl BookEntry {
    /// A new enabled entry with the editor's default insertion order.
    pub fn new(keys: Vec<String>, content: impl Into<String>) -> Self {
        Self {
            keys,
            content: content.into(),
            insertion_order: DEFAULT_INSERTION_ORDER,
            enabled: true,
            extra: IndexMap::new(),
        }
    }
}

fn default_insertion_order() -> i64 {
    DEFAULT_INSERTION_ORDER
}

fn default_enabled() -> bool {
    true
}

fn insertion_order<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(DEFAULT_INSERTION_ORDER))
}

fn enabled<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// Treat an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Text some cards store as a number: dates as unix timestamps, versions
/// as bare `2`.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn test_blank_document() {
        let doc = CharacterDocument::new_blank(day());
        assert_eq!(doc.spec, SPEC_V3);
        assert_eq!(doc.spec_version, SPEC_VERSION_V3);
        assert_eq!(doc.data.character_version, "1.0");
        assert_eq!(doc.data.creation_date, "2024-05-17");
        assert_eq!(doc.data.modification_date, "2024-05-17");
        assert!(doc.data.character_book.entries.is_empty());
    }

    #[test]
    fn test_nulls_become_defaults() {
        let doc: CharacterDocument = serde_json::from_value(json!({
            "spec": "chara_card_v3",
            "spec_version": "3.0",
            "data": {
                "name": null,
                "tags": null,
                "character_book": null,
                "extensions": null
            }
        }))
        .unwrap();

        assert_eq!(doc.data.name, "");
        assert!(doc.data.tags.is_empty());
        assert!(doc.data.character_book.entries.is_empty());
        assert!(doc.data.extensions.is_empty());
    }

    #[test]
    fn test_numeric_dates_accepted() {
        let data: CardData = serde_json::from_value(json!({
            "creation_date": 1715904000,
            "modification_date": "2024-05-17"
        }))
        .unwrap();
        assert_eq!(data.creation_date, "1715904000");
        assert_eq!(data.modification_date, "2024-05-17");
    }

    #[test]
    fn test_numeric_character_version_accepted() {
        let data: CardData = serde_json::from_value(json!({"character_version": 2})).unwrap();
        assert_eq!(data.character_version, "2");

        let data: CardData = serde_json::from_value(json!({"character_version": 1.5})).unwrap();
        assert_eq!(data.character_version, "1.5");
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let value = json!({
            "name": "Aria",
            "source": ["https://example.com/aria"],
            "character_book": {
                "name": "Aria's world",
                "entries": [{"keys": ["castle"], "content": "Old.", "id": 7}]
            }
        });
        let data: CardData = serde_json::from_value(value).unwrap();

        assert_eq!(data.extra["source"], json!(["https://example.com/aria"]));
        assert_eq!(data.character_book.extra["name"], json!("Aria's world"));
        let entry = &data.character_book.entries[0];
        assert_eq!(entry.extra["id"], json!(7));
        assert_eq!(entry.insertion_order, DEFAULT_INSERTION_ORDER);
        assert!(entry.enabled);

        let back = serde_json::to_value(&data).unwrap();
        assert_eq!(back["source"], json!(["https://example.com/aria"]));
    }
}
