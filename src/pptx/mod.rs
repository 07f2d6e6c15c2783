//! PowerPoint (.pptx) extraction.
//!
//! Each extractor handles one kind of part and can be used on its own;
//! [`DeckConverter`] runs them all and assembles a [`Deck`](crate::Deck).

mod association;
mod charts;
mod converter;
mod groups;
mod images;
mod notes;
mod slides;

pub use association::{ChartAssociation, NumericProximity};
pub use charts::{detect_chart_type, parse_chart, ChartExtractor, ChartStats};
pub use converter::{display_name, Conversion, DeckConverter};
pub use groups::{process_group, shape_position, shape_text, GroupHandler, GroupStats};
pub use images::{find_pictures, image_dimensions, ImageExtractor, ImageStats, PictureRef};
pub use notes::{parse_notes, NotesExtractor, NotesMatch, NotesStats};
pub use slides::{
    paragraph_text, parse_relationships, parse_slide_content, read_relationships,
    relationships_path, SlideContent,
};
