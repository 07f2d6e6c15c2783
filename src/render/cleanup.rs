//! Text cleanup and normalization utilities.
//!
//! Extractors run every text run through [`normalize_text`]; the Markdown
//! renderer uses the rest to keep user text from breaking its syntax.

use unicode_normalization::UnicodeNormalization;

/// Longest alt text embedded in image syntax, ellipsis included.
pub const MAX_ALT_TEXT_CHARS: usize = 200;

/// Normalize a text run to NFC form and standardize invisible characters.
pub fn normalize_text(text: &str) -> String {
    let normalized: String = text.nfc().collect();

    normalized
        // Various spaces (non-breaking, en, em, thin, hair, narrow no-break)
        .replace(
            [
                '\u{00A0}', '\u{2002}', '\u{2003}', '\u{2009}', '\u{200A}', '\u{202F}',
            ],
            " ",
        )
        // Zero-width characters (zero-width space, non-joiner, joiner, BOM)
        .replace(['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'], "")
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Make alt text safe for `![alt](...)`.
///
/// Line breaks and brackets become spaces, whitespace is collapsed, and text
/// longer than [`MAX_ALT_TEXT_CHARS`] is cut with a trailing `...`.
pub fn sanitize_alt_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| match c {
            '\r' | '\n' | '[' | ']' => ' ',
            other => other,
        })
        .collect();
    let collapsed = collapse_whitespace(&replaced);

    if collapsed.chars().count() > MAX_ALT_TEXT_CHARS {
        let cut: String = collapsed.chars().take(MAX_ALT_TEXT_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        collapsed
    }
}

/// Escape a value for a Markdown table cell.
pub fn escape_table_cell(text: &str) -> String {
    collapse_whitespace(&text.replace('|', "\\|"))
}

/// Collapse three or more consecutive newlines down to one blank line.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        result.push(c);
    }
    result
}
