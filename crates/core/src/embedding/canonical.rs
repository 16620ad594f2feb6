//! Canonical text construction
//!
//! The embedding model's input for an object is a deterministic string built
//! from its fields. Determinism matters twice: identical records must embed
//! identically across runs, and tests must be able to predict the exact
//! model input for a given record.

use crate::types::ObjectRecord;

/// Candidate metadata spellings for each priority slot, in slot order:
/// title, type, creator, culture, medium, classification, category.
///
/// Matching is case- and separator-insensitive, so "Artist Display Name",
/// "ArtistDisplayName" and "artist_display_name" all hit the creator slot.
const PRIORITY_SLOTS: &[&[&str]] = &[
    &["title"],
    &["objectname", "type"],
    &["artistdisplayname", "creator", "artist"],
    &["culture"],
    &["medium"],
    &["classification"],
    &["category", "department"],
];

/// Separator between canonical text parts
const SEPARATOR: &str = " | ";

/// Normalize a field name for matching: lowercase, alphanumerics only
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Extract a non-empty trimmed string value from a JSON value
fn string_value(value: &serde_json::Value) -> Option<&str> {
    match value {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        }
        _ => None,
    }
}

/// Build the canonical text for an object
///
/// Joins, with `" | "`, the first non-empty value for each priority slot
/// (title, type, creator, culture, medium, classification, category). The
/// projected `title`/`creator` fields are preferred for their slots, falling
/// back to the metadata spellings.
///
/// If no priority slot matches anything, falls back to all non-empty raw
/// string values joined in ascending order of normalized field name. That
/// order is fixed: the fallback must not depend on map iteration order.
///
/// Returns `None` when the result would be empty after trimming; such an
/// object has nothing to embed and is skipped by the batch processor.
pub fn canonical_text(record: &ObjectRecord) -> Option<String> {
    let normalized: Vec<(String, &str)> = record
        .metadata
        .iter()
        .filter_map(|(key, value)| string_value(value).map(|v| (normalize_key(key), v)))
        .collect();

    let lookup = |candidates: &[&str]| -> Option<&str> {
        candidates.iter().find_map(|candidate| {
            normalized
                .iter()
                .find(|(key, _)| key == candidate)
                .map(|(_, value)| *value)
        })
    };

    let mut parts: Vec<&str> = Vec::new();
    for (slot, candidates) in PRIORITY_SLOTS.iter().enumerate() {
        let projected = match slot {
            0 => Some(record.title.trim()).filter(|t| !t.is_empty()),
            2 => Some(record.creator.trim()).filter(|c| !c.is_empty()),
            _ => None,
        };
        if let Some(value) = projected.or_else(|| lookup(candidates)) {
            parts.push(value);
        }
    }

    if parts.is_empty() {
        // Fallback: every non-empty raw value, in normalized-key order
        let mut pairs = normalized;
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        parts = pairs.into_iter().map(|(_, value)| value).collect();
    }

    if parts.is_empty() {
        return None;
    }

    let text = parts.join(SEPARATOR);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
