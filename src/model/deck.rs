//! Deck and slide model structures.

use super::{Chart, Group, Image, SlideImage};
use serde::Serialize;

/// Presentation metadata from docProps/core.xml.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeckMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Creation date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last modification date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

/// Role of a text block on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    Title,
    Body,
}

/// One paragraph of slide text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub kind: TextKind,
    pub text: String,
    /// Outline level from `a:pPr@lvl`, 0 for top-level paragraphs
    pub level: u32,
}

impl TextBlock {
    pub fn title(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Title,
            text: text.into(),
            level: 0,
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self {
            kind: TextKind::Body,
            text: text.into(),
            level: 0,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

/// A table placed on a slide; the first row is the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlideTable {
    pub rows: Vec<Vec<String>>,
}

impl SlideTable {
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.column_count() == 0
    }
}

/// One slide of the deck.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Slide {
    /// 1-based ordinal taken from the entry name (`slide7.xml` is 7)
    pub number: u32,
    /// Archive path of the slide markup
    pub path: String,
    /// Text blocks in document order
    pub blocks: Vec<TextBlock>,
    /// Tables in document order
    pub tables: Vec<SlideTable>,
    /// Images correlated with this slide, in picture order
    pub images: Vec<SlideImage>,
    /// Identifiers of charts associated with this slide
    pub charts: Vec<String>,
    /// Speaker notes; `None` means the slide has no notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Grouped shapes found on the slide
    pub groups: Vec<Group>,
    /// The slide markup could not be read or parsed
    pub failed: bool,
}

impl Slide {
    pub fn new(number: u32, path: impl Into<String>) -> Self {
        Self {
            number,
            path: path.into(),
            ..Default::default()
        }
    }

    /// Whether the slide carries any body content.
    pub fn has_content(&self) -> bool {
        !self.blocks.is_empty() || self.tables.iter().any(|t| !t.is_empty())
    }

    /// Text of the title block, if any.
    pub fn title(&self) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.kind == TextKind::Title)
            .map(|b| b.text.as_str())
    }

    /// All slide text joined with newlines.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Per-slide notes result from a batch extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideNotes {
    pub slide_number: u32,
    pub notes: Option<String>,
    pub has_notes: bool,
}

/// Summary counters for a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeckStats {
    pub slide_count: usize,
    pub image_count: usize,
    pub chart_count: usize,
    /// Slides with speaker notes
    pub notes_count: usize,
    pub group_count: usize,
    /// Child shapes across all groups
    pub grouped_shape_count: usize,
    /// Slides whose markup could not be parsed
    pub failed_slides: usize,
    /// Picture matches made by the first-unclaimed fallback
    pub low_confidence_matches: usize,
    /// Extraction time in milliseconds
    pub elapsed_ms: u128,
}

/// A fully extracted presentation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Deck {
    /// Source file name, used as the document heading
    pub name: String,
    pub metadata: DeckMetadata,
    /// Slides in increasing ordinal order
    pub slides: Vec<Slide>,
    /// Every extracted image
    pub images: Vec<Image>,
    /// Every extracted chart
    pub charts: Vec<Chart>,
    pub stats: DeckStats,
}

impl Deck {
    pub fn image(&self, id: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.id == id)
    }

    pub fn chart(&self, id: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.id == id)
    }

    /// Images as `(filename, payload)` pairs for bulk export.
    pub fn export_images(&self) -> Vec<(String, Vec<u8>)> {
        self.images
            .iter()
            .map(|i| (i.filename.clone(), i.data.clone()))
            .collect()
    }

    /// Slide text and notes of the whole deck.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for slide in &self.slides {
            let text = slide.plain_text();
            if !text.is_empty() {
                out.push_str(&text);
                out.push('\n');
            }
            if let Some(ref notes) = slide.notes {
                out.push_str(notes);
                out.push('\n');
            }
        }
        out
    }
}
