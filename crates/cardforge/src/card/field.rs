//! Addressable card fields and the values they hold.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::Value;

use super::document::{CardData, CharacterBook};
use crate::error::{CardError, Result};

/// A field of [`CardData`] that can be read from a source card or edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    Name,
    Nickname,
    Description,
    Personality,
    Scenario,
    FirstMes,
    MesExample,
    CreatorNotes,
    SystemPrompt,
    PostHistoryInstructions,
    AlternateGreetings,
    CharacterBook,
    Tags,
    Creator,
    CharacterVersion,
    CreationDate,
    ModificationDate,
    Extensions,
}

/// Shape of the value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    List,
    Book,
    Map,
}

impl CardField {
    /// Every field, in card order.
    pub const ALL: [CardField; 18] = [
        CardField::Name,
        CardField::Nickname,
        CardField::Description,
        CardField::Personality,
        CardField::Scenario,
        CardField::FirstMes,
        CardField::MesExample,
        CardField::CreatorNotes,
        CardField::SystemPrompt,
        CardField::PostHistoryInstructions,
        CardField::AlternateGreetings,
        CardField::CharacterBook,
        CardField::Tags,
        CardField::Creator,
        CardField::CharacterVersion,
        CardField::CreationDate,
        CardField::ModificationDate,
        CardField::Extensions,
    ];

    /// JSON key of the field.
    pub fn key(self) -> &'static str {
        match self {
            CardField::Name => "name",
            CardField::Nickname => "nickname",
            CardField::Description => "description",
            CardField::Personality => "personality",
            CardField::Scenario => "scenario",
            CardField::FirstMes => "first_mes",
            CardField::MesExample => "mes_example",
            CardField::CreatorNotes => "creator_notes",
            CardField::SystemPrompt => "system_prompt",
            CardField::PostHistoryInstructions => "post_history_instructions",
            CardField::AlternateGreetings => "alternate_greetings",
            CardField::CharacterBook => "character_book",
            CardField::Tags => "tags",
            CardField::Creator => "creator",
            CardField::CharacterVersion => "character_version",
            CardField::CreationDate => "creation_date",
            CardField::ModificationDate => "modification_date",
            CardField::Extensions => "extensions",
        }
    }

    /// Shape of the value stored in this field.
    pub fn kind(self) -> FieldKind {
        match self {
            CardField::AlternateGreetings | CardField::Tags => FieldKind::List,
            CardField::CharacterBook => FieldKind::Book,
            CardField::Extensions => FieldKind::Map,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CardField {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        CardField::ALL
            .into_iter()
            .find(|field| field.key() == normalized)
            .ok_or_else(|| CardError::InvalidCard(format!("Unknown field: {}", s)))
    }
}

/// A value destined for a [`CardField`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Book(CharacterBook),
    Map(IndexMap<String, Value>),
}

impl FieldValue {
    fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::List(_) => FieldKind::List,
            FieldValue::Book(_) => FieldKind::Book,
            FieldValue::Map(_) => FieldKind::Map,
        }
    }

    /// The empty value of a given kind.
    pub fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => FieldValue::Text(String::new()),
            FieldKind::List => FieldValue::List(Vec::new()),
            FieldKind::Book => FieldValue::Book(CharacterBook::default()),
            FieldKind::Map => FieldValue::Map(IndexMap::new()),
        }
    }
}

impl CardData {
    /// Store `value` into `field`, rejecting values of the wrong shape.
    pub fn set(&mut self, field: CardField, value: FieldValue) -> Result<()> {
        if field.kind() != value.kind() {
            return Err(CardError::InvalidCard(format!(
                "Field '{}' expects {:?}, got {:?}",
                field,
                field.kind(),
                value.kind()
            )));
        }

        match (field, value) {
            (CardField::Name, FieldValue::Text(v)) => self.name = v,
            (CardField::Nickname, FieldValue::Text(v)) => self.nickname = Some(v),
            (CardField::Description, FieldValue::Text(v)) => self.description = v,
            (CardField::Personality, FieldValue::Text(v)) => self.personality = v,
            (CardField::Scenario, FieldValue::Text(v)) => self.scenario = v,
            (CardField::FirstMes, FieldValue::Text(v)) => self.first_mes = v,
            (CardField::MesExample, FieldValue::Text(v)) => self.mes_example = v,
            (CardField::CreatorNotes, FieldValue::Text(v)) => self.creator_notes = v,
            (CardField::SystemPrompt, FieldValue::Text(v)) => self.system_prompt = v,
            (CardField::PostHistoryInstructions, FieldValue::Text(v)) => {
                self.post_history_instructions = v
            }
            (CardField::AlternateGreetings, FieldValue::List(v)) => self.alternate_greetings = v,
            (CardField::CharacterBook, FieldValue::Book(v)) => self.character_book = v,
            (CardField::Tags, FieldValue::List(v)) => self.tags = v,
            (CardField::Creator, FieldValue::Text(v)) => self.creator = v,
            (CardField::CharacterVersion, FieldValue::Text(v)) => self.character_version = v,
            (CardField::CreationDate, FieldValue::Text(v)) => self.creation_date = v,
            (CardField::ModificationDate, FieldValue::Text(v)) => self.modification_date = v,
            (CardField::Extensions, FieldValue::Map(v)) => self.extensions = v,
            // Kinds were checked above.
            (field, _) => {
                return Err(CardError::InvalidCard(format!(
                    "Field '{}' cannot hold this value",
                    field
                )))
            }
        }
        Ok(())
    }

    /// Read a text field, `None` for fields of another kind.
    pub fn text(&self, field: CardField) -> Option<&str> {
        let value = match field {
            CardField::Name => &self.name,
            CardField::Nickname => return self.nickname.as_deref(),
            CardField::Description => &self.description,
            CardField::Personality => &self.personality,
            CardField::Scenario => &self.scenario,
            CardField::FirstMes => &self.first_mes,
            CardField::MesExample => &self.mes_example,
            CardField::CreatorNotes => &self.creator_notes,
            CardField::SystemPrompt => &self.system_prompt,
            CardField::PostHistoryInstructions => &self.post_history_instructions,
            CardField::Creator => &self.creator,
            CardField::CharacterVersion => &self.character_version,
            CardField::CreationDate => &self.creation_date,
            CardField::ModificationDate => &self.modification_date,
            _ => return None,
        };
        Some(value)
    }
}
