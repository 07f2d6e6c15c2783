//! JSON renderer implementation.

use crate::error::Result;
use crate::model::Deck;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert a Deck to JSON.
///
/// Image payloads are left out; export them with [`Deck::export_images`].
pub fn to_json(deck: &Deck, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(deck)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(deck)?,
    };
    Ok(json)
}

/// Convert a Deck to JSON with default formatting.
pub fn to_json_default(deck: &Deck) -> Result<String> {
    to_json(deck, JsonFormat::Pretty)
}
