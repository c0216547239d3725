//! Resolves a selected table row to the map identifier to highlight.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::report::FlatRow;

/// Digits surrounded by whitespace, as validators embed ids mid-sentence.
static EMBEDDED_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+(\d+)\s+").unwrap());

/// First embedded id in the message, else the row's own target id, else nothing.
pub fn resolve_target(row: &FlatRow) -> Option<String> {
    if let Some(found) = EMBEDDED_ID
        .captures(&row.message)
        .and_then(|caps| caps.get(1))
    {
        return Some(found.as_str().to_string());
    }
    let target = row.target_id.trim();
    (!target.is_empty()).then(|| target.to_string())
}

/// Text shown next to the figure for the current selection.
pub fn selection_label(selected: Option<&str>) -> String {
    format!("selected id: {}", selected.unwrap_or("none"))
}
