//! Keyword search over entity attributes.

use tracing::debug;

use crate::collection::Collection;
use crate::entity::Entity;
use crate::value::Value;

/// Normalize a value for keyword matching.
///
/// Lower-cases, replaces every non-alphanumeric character with a space and
/// collapses runs of whitespace. Missing and null values clean to `""`.
pub fn cleanup_search_target(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(value) => cleanup(&value.to_query_string()),
    }
}

fn cleanup(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The text an entity is searched by: its id followed by the cleaned value
/// of each field, space-separated.
pub fn prepare_search_target<S: AsRef<str>>(entity: &Entity, fields: &[S]) -> String {
    fields.iter().fold(entity.id.clone(), |mut target, field| {
        target.push(' ');
        target.push_str(&cleanup_search_target(entity.attribute(field.as_ref())));
        target
    })
}

/// Keep entities whose search target contains every keyword.
///
/// Keywords are cleaned like attribute values and matched as substrings, in
/// any order. Blank keywords keep every entity.
pub fn filter_by_keywords<S: AsRef<str>>(entities: &Collection, keywords: &str, fields: &[S]) -> Collection {
    let cleaned = cleanup(keywords);
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.is_empty() {
        return entities.clone();
    }

    let result = entities.filter(|entity| {
        let target = prepare_search_target(entity, fields);
        words.iter().all(|word| target.contains(word))
    });
    debug!(kept = result.len(), total = entities.len(), keywords, "filtered by keywords");
    result
}
