//! Character card document model, schema normalization and editing.

mod document;
mod edit;
mod field;
mod normalize;

pub use document::{
    format_date, BookEntry, CardData, CharacterBook, CharacterDocument, DATE_FORMAT,
    DEFAULT_CHARACTER_VERSION, DEFAULT_INSERTION_ORDER, SPEC_V2, SPEC_V3, SPEC_VERSION_V3,
};
pub use edit::split_keys;
pub use field::{CardField, FieldKind, FieldValue};
pub use normalize::{normalize, normalize_at, SchemaVersion};
