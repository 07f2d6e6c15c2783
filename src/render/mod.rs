//! Output rendering for decks.
//!
//! # Example
//!
//! ```no_run
//! use unslide::render::*;
//! use unslide::{ConvertOptions, DeckConverter};
//!
//! let options = ConvertOptions::default();
//! let deck = DeckConverter::new(options.clone()).convert_file("deck.pptx")?.deck;
//!
//! // Render to Markdown
//! let md = to_markdown(&deck, &options)?;
//!
//! // Render to JSON
//! let json = to_json(&deck, JsonFormat::Pretty)?;
//! # Ok::<(), unslide::Error>(())
//! ```

pub mod cleanup;
mod json;
mod markdown;
mod options;

pub use json::{to_json, to_json_default, JsonFormat};
pub use markdown::{render_chart, render_image, render_slide, to_markdown, LOW_CONFIDENCE_NOTE, NO_CONTENT};
pub use options::ConvertOptions;
