//! Shaping model replies into card values.

use crate::card::{BookEntry, CharacterDocument};
use crate::error::{CardError, Result};

const KEYWORD_LABELS: [&str; 3] = ["关键词:", "关键词：", "Keywords:"];
const CONTENT_LABELS: [&str; 3] = ["内容:", "内容：", "Content:"];

/// Turn a generated reply into a lore-book entry.
///
/// A `Keywords:` line supplies the keys, a `Content:` line starts the body
/// and everything after it belongs to the body too. Missing keys fall back
/// to `fallback_key`; a missing content label makes the whole reply the body.
pub fn parse_book_entry(text: &str, fallback_key: &str) -> BookEntry {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    let mut keys = Vec::new();
    let mut content = text.to_string();

    for (i, line) in lines.iter().enumerate() {
        if let Some(rest) = after_label(line, &KEYWORD_LABELS) {
            keys = split_list(rest, &[',', '，']);
        } else if let Some(rest) = after_label(line, &CONTENT_LABELS) {
            let mut body = vec![rest];
            body.extend_from_slice(&lines[i + 1..]);
            content = body.join("\n");
            break;
        }
    }

    if keys.is_empty() {
        keys.push(fallback_key.to_string());
    }
    BookEntry::new(keys, content.trim())
}

/// Split a generated tag list on commas and newlines.
pub fn parse_tags(text: &str) -> Vec<String> {
    split_list(text, &[',', '，', '\n'])
        .into_iter()
        .map(|tag| tag.trim_start_matches('#').trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// A lore-book entry is generated from the card's name and description.
pub fn ensure_ready_for_book_generation(document: &CharacterDocument) -> Result<()> {
    let data = &document.data;
    if data.name.trim().is_empty() || data.description.trim().is_empty() {
        return Err(CardError::IncompleteCard(
            "Fill in the character name and description first".to_string(),
        ));
    }
    Ok(())
}

/// Text after the first label found in `line`, if it is non-blank.
fn after_label<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    labels.iter().find_map(|label| {
        let (_, rest) = line.split_once(label)?;
        let rest = rest.trim_start();
        (!rest.is_empty()).then_some(rest)
    })
}

fn split_list(text: &str, separators: &[char]) -> Vec<String> {
    text.split(separators)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_book_entry_with_labels() {
        let reply = "关键词：森林, 精灵，古树\n内容: The elves guard the old grove.\nNobody enters at night.";
        let entry = parse_book_entry(reply, "Aria");

        assert_eq!(entry.keys, vec!["森林", "精灵", "古树"]);
        assert_eq!(
            entry.content,
            "The elves guard the old grove.\nNobody enters at night."
        );
        assert_eq!(entry.insertion_order, 100);
        assert!(entry.enabled);
    }

    #[test]
    fn test_book_entry_english_labels() {
        let entry = parse_book_entry("Keywords: sword, oath\n\nContent: Sworn at dawn.", "X");
        assert_eq!(entry.keys, vec!["sword", "oath"]);
        assert_eq!(entry.content, "Sworn at dawn.");
    }

    #[test]
    fn test_book_entry_unlabelled_reply() {
        let entry = parse_book_entry("  Just some lore.  \n", "Aria");
        assert_eq!(entry.keys, vec!["Aria"]);
        assert_eq!(entry.content, "Just some lore.");
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags("#fantasy, elf，  \nranger\n#"),
            vec!["fantasy", "elf", "ranger"]
        );
        assert!(parse_tags(" , \n").is_empty());
    }

    #[test]
    fn test_book_generation_needs_name_and_description() {
        let mut doc = CharacterDocument::new_blank(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        doc.data.name = "Aria".to_string();
        assert!(matches!(
            ensure_ready_for_book_generation(&doc),
            Err(CardError::IncompleteCard(_))
        ));

        doc.data.description = "A ranger.".to_string();
        assert!(ensure_ready_for_book_generation(&doc).is_ok());
    }
}
