//! Set command - update one field of a card in place.

use std::path::PathBuf;

use colored::Colorize;
use cardforge::card::{split_keys, FieldKind};
use cardforge::{CardField, FieldValue};

use super::{open_workspace, save_in_place, CommandResult};

pub fn run(card: PathBuf, field: String, value: String) -> CommandResult {
    let field: CardField = field.parse()?;
    let value = match field.kind() {
        FieldKind::Text => FieldValue::Text(value),
        FieldKind::List => FieldValue::List(split_keys(&value)),
        FieldKind::Book => return Err("Use 'cardforge book' to edit the lore book".into()),
        FieldKind::Map => {
            return Err(format!("Field '{}' cannot be set from the command line", field).into());
        }
    };

    let mut workspace = open_workspace(&card)?;
    workspace.update_field(field, value)?;
    save_in_place(&card, &workspace)?;

    println!(
        "{} {} on {}",
        "Updated".green().bold(),
        field.to_string().cyan(),
        workspace.document.display_name().white()
    );
    Ok(())
}
