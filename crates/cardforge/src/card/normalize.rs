//! Schema normalization: v1 / v2 / v3 cards into the canonical v3 document.
//!
//! v3 cards pass through untouched apart from the discriminators; a field
//! whose value does not fit the model is dropped on its own. Older
//! generations are read through per-version mapping tables: each canonical
//! field lists the source paths to try in priority order and the value to
//! use when none of them hold anything.

use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::document::{
    format_date, BookEntry, CardData, CharacterBook, CharacterDocument, DEFAULT_CHARACTER_VERSION, SPEC_V2,
    SPEC_V3, SPEC_VERSION_V3,
};
use super::field::{CardField, FieldKind, FieldValue};
use crate::error::{CardError, Result};

/// Card schema generation detected on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    V1,
    V2,
    V3,
}

impl SchemaVersion {
    /// Classify a parsed card. Checked in order: v3 discriminators, then v2
    /// discriminator or a nested `data` record, then everything else.
    pub fn detect(value: &Value) -> Self {
        let spec = value.get("spec").and_then(Value::as_str);
        let spec_version = value.get("spec_version").and_then(Value::as_str);

        if spec == Some(SPEC_V3) || spec_version == Some(SPEC_VERSION_V3) {
            SchemaVersion::V3
        } else if spec == Some(SPEC_V2) || value.get("data").is_some_and(Value::is_object) {
            SchemaVersion::V2
        } else {
            SchemaVersion::V1
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
            SchemaVersion::V3 => write!(f, "v3"),
        }
    }
}

/// Value used when no source path yields anything.
#[derive(Debug, Clone, Copy)]
enum Fallback {
    /// Empty string / list / book / map depending on the field.
    Empty,
    /// A fixed text value.
    Text(&'static str),
    /// The normalization date.
    Today,
    /// Leave the field unset (only meaningful for `nickname`).
    Absent,
}

/// One row of a mapping table.
#[derive(Debug)]
struct FieldRule {
    field: CardField,
    sources: &'static [&'static [&'static str]],
    fallback: Fallback,
}

const fn rule(
    field: CardField,
    sources: &'static [&'static [&'static str]],
    fallback: Fallback,
) -> FieldRule {
    FieldRule {
        field,
        sources,
        fallback,
    }
}

const V2_RULES: &[FieldRule] = &[
    rule(CardField::Name, &[&["data", "name"], &["name"]], Fallback::Empty),
    rule(CardField::Nickname, &[&["data", "nickname"]], Fallback::Absent),
    rule(CardField::Description, &[&["data", "description"], &["description"]], Fallback::Empty),
    rule(CardField::Personality, &[&["data", "personality"], &["personality"]], Fallback::Empty),
    rule(CardField::Scenario, &[&["data", "scenario"], &["scenario"]], Fallback::Empty),
    rule(CardField::FirstMes, &[&["data", "first_mes"], &["first_mes"]], Fallback::Empty),
    rule(CardField::MesExample, &[&["data", "mes_example"], &["mes_example"]], Fallback::Empty),
    rule(CardField::CreatorNotes, &[&["data", "creator_notes"], &["creator_notes"]], Fallback::Empty),
    rule(CardField::SystemPrompt, &[&["data", "system_prompt"]], Fallback::Empty),
    rule(
        CardField::PostHistoryInstructions,
        &[&["data", "post_history_instructions"]],
        Fallback::Empty,
    ),
    rule(CardField::AlternateGreetings, &[&["data", "alternate_greetings"]], Fallback::Empty),
    rule(CardField::CharacterBook, &[&["data", "character_book"]], Fallback::Empty),
    rule(CardField::Tags, &[&["data", "tags"]], Fallback::Empty),
    rule(CardField::Creator, &[&["data", "creator"]], Fallback::Empty),
    rule(
        CardField::CharacterVersion,
        &[&["data", "character_version"]],
        Fallback::Text(DEFAULT_CHARACTER_VERSION),
    ),
    rule(CardField::CreationDate, &[], Fallback::Today),
    rule(CardField::ModificationDate, &[], Fallback::Today),
    rule(CardField::Extensions, &[&["data", "extensions"]], Fallback::Empty),
];

const V1_RULES: &[FieldRule] = &[
    rule(CardField::Name, &[&["name"]], Fallback::Empty),
    rule(CardField::Description, &[&["description"]], Fallback::Empty),
    rule(CardField::Personality, &[&["personality"]], Fallback::Empty),
    rule(CardField::Scenario, &[&["scenario"]], Fallback::Empty),
    rule(CardField::FirstMes, &[&["first_mes"]], Fallback::Empty),
    rule(CardField::MesExample, &[&["mes_example"]], Fallback::Empty),
    rule(CardField::CreatorNotes, &[&["creator_notes"]], Fallback::Empty),
    rule(CardField::SystemPrompt, &[], Fallback::Empty),
    rule(CardField::PostHistoryInstructions, &[], Fallback::Empty),
    rule(CardField::AlternateGreetings, &[&["alternate_greetings"]], Fallback::Empty),
    rule(CardField::CharacterBook, &[], Fallback::Empty),
    rule(CardField::Tags, &[&["tags"]], Fallback::Empty),
    rule(CardField::Creator, &[&["creator"]], Fallback::Empty),
    rule(CardField::CharacterVersion, &[], Fallback::Text(DEFAULT_CHARACTER_VERSION)),
    rule(CardField::CreationDate, &[], Fallback::Today),
    rule(CardField::ModificationDate, &[], Fallback::Today),
    rule(CardField::Extensions, &[], Fallback::Empty),
];

/// Normalize a parsed card, stamping dates with today's (UTC) date.
pub fn normalize(value: &Value) -> Result<CharacterDocument> {
    normalize_at(value, Utc::now().date_naive())
}

/// Normalize a parsed card, stamping dates with `today`.
pub fn normalize_at(value: &Value, today: NaiveDate) -> Result<CharacterDocument> {
    if !value.is_object() {
        return Err(CardError::InvalidCard(format!(
            "expected a JSON object, found {}",
            json_type(value)
        )));
    }

    let version = SchemaVersion::detect(value);
    debug!(schema = %version, "normalizing card");

    let mut document = match version {
        SchemaVersion::V3 => decode_v3(value)?,
        SchemaVersion::V2 => apply_rules(value, V2_RULES, today),
        SchemaVersion::V1 => apply_rules(value, V1_RULES, today),
    };

    document.stamp_v3();
    Ok(document)
}

/// Decode a v3 card as-is. Values that do not fit the model are dropped
/// from a copy of the card; everything else, unknown fields included,
/// decodes untouched.
fn decode_v3(value: &Value) -> Result<CharacterDocument> {
    let error = match CharacterDocument::deserialize(value) {
        Ok(document) => return Ok(document),
        Err(e) => e,
    };
    warn!(error = %error, "v3 card did not decode cleanly, dropping mistyped fields");

    let mut patched = value.clone();
    if let Some(root) = patched.as_object_mut() {
        for key in ["spec", "spec_version"] {
            if root.get(key).is_some_and(|v| !v.is_string() && !v.is_null()) {
                root.remove(key);
            }
        }
        match root.get_mut("data") {
            Some(Value::Object(data)) => patch_card_data(data),
            Some(Value::Null) | None => {}
            Some(other) => {
                warn!(found = json_type(other), "v3 card data is not an object");
                *other = Value::Object(Map::new());
            }
        }
    }

    CharacterDocument::deserialize(&patched)
        .map_err(|e| CardError::InvalidCard(format!("v3 card could not be decoded: {}", e)))
}

/// Drop mistyped lore-book entries, then mistyped card fields.
fn patch_card_data(data: &mut Map<String, Value>) {
    if let Some(Value::Object(book)) = data.get_mut("character_book") {
        if let Some(Value::Array(entries)) = book.get_mut("entries") {
            let before = entries.len();
            entries.retain(|entry| BookEntry::deserialize(entry).is_ok());
            if entries.len() < before {
                warn!(dropped = before - entries.len(), "dropping malformed lore-book entries");
            }
        }
    }

    let rejected: Vec<String> = data
        .iter()
        .filter(|(key, value)| !fits_card_data(key, value))
        .map(|(key, _)| key.clone())
        .collect();

    for key in &rejected {
        warn!(field = %key, "dropping v3 field with an unexpected type");
        data.remove(key);
    }
    if rejected.iter().any(|key| key == "character_version") {
        data.insert(
            "character_version".to_string(),
            Value::String(DEFAULT_CHARACTER_VERSION.to_string()),
        );
    }
}

/// Whether `key: value` alone decodes as card data.
fn fits_card_data(key: &str, value: &Value) -> bool {
    let mut single = Map::new();
    single.insert(key.to_string(), value.clone());
    CardData::deserialize(Value::Object(single)).is_ok()
}

/// Run a mapping table against `value`.
fn apply_rules(value: &Value, rules: &[FieldRule], today: NaiveDate) -> CharacterDocument {
    let mut data = CardData::default();

    for rule in rules {
        let kind = rule.field.kind();
        let found = rule
            .sources
            .iter()
            .find_map(|path| lookup(value, path).and_then(|v| read_as(v, kind)));

        let resolved = match (found, rule.fallback) {
            (Some(v), _) => Some(v),
            (None, Fallback::Empty) => Some(FieldValue::empty(kind)),
            (None, Fallback::Text(text)) => Some(FieldValue::Text(text.to_string())),
            (None, Fallback::Today) => Some(FieldValue::Text(format_date(today))),
            (None, Fallback::Absent) => None,
        };

        if let Some(v) = resolved {
            // Kinds come from the field itself, so this cannot mismatch.
            if let Err(e) = data.set(rule.field, v) {
                warn!(field = %rule.field, error = %e, "mapping rule produced the wrong kind");
            }
        }
    }

    CharacterDocument {
        spec: SPEC_V3.to_string(),
        spec_version: SPEC_VERSION_V3.to_string(),
        data,
    }
}

/// Follow a key path through nested objects.
fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Interpret a source value as a field of `kind`, or `None` to try the next
/// source. Empty strings count as missing; lists keep only their strings.
fn read_as(value: &Value, kind: FieldKind) -> Option<FieldValue> {
    match (kind, value) {
        (FieldKind::Text, Value::String(s)) if !s.is_empty() => Some(FieldValue::Text(s.clone())),
        (FieldKind::List, Value::Array(items)) => Some(FieldValue::List(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        )),
        (FieldKind::Book, Value::Object(_)) => CharacterBook::deserialize(value)
            .ok()
            .map(FieldValue::Book),
        (FieldKind::Map, Value::Object(map)) => Some(FieldValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<IndexMap<_, _>>(),
        )),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
