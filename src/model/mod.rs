//! Data model for an extracted presentation.
//!
//! Extractors build these structures during a single pass over one
//! document; after that they are read-only, apart from the image
//! enrichment merge and the notes cache, both of which only ever move from
//! "unknown" to "resolved".

mod chart;
mod deck;
mod group;
mod image;

pub use chart::*;
pub use deck::*;
pub use group::*;
pub use image::*;
