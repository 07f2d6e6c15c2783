//! # unslide
//!
//! PowerPoint (.pptx) extraction to Markdown.
//!
//! Slide text, tables, embedded images, chart data, speaker notes and
//! grouped shapes are pulled out of the package and rendered as one
//! Markdown document, or serialized as structured JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! // Convert to Markdown
//! let markdown = unslide::to_markdown("deck.pptx")?;
//! std::fs::write("deck.md", markdown)?;
//!
//! // Full extraction with access to structure
//! let conversion = unslide::convert_file("deck.pptx", &unslide::ConvertOptions::default())?;
//! println!("Slides: {}", conversion.deck.slides.len());
//! println!("Charts: {}", conversion.deck.charts.len());
//! # Ok::<(), unslide::Error>(())
//! ```
//!
//! ## Component APIs
//!
//! ```no_run
//! use unslide::container::PptxContainer;
//! use unslide::pptx::{ChartExtractor, NotesExtractor};
//!
//! let container = PptxContainer::open("deck.pptx")?;
//!
//! let mut charts = ChartExtractor::new();
//! for chart in charts.extract_all(&container) {
//!     println!("{} ({} series)", chart.title, chart.series.len());
//! }
//!
//! let mut notes = NotesExtractor::new(&container);
//! println!("{:?}", notes.extract_for_slide(1));
//! # Ok::<(), unslide::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async`: Async file conversion with Tokio

pub mod container;
pub mod detect;
pub mod encoding;
pub mod error;
pub mod model;
pub mod pptx;
pub mod render;
pub mod xml;

#[cfg(test)]
mod test_support;

// Re-exports
pub use container::PptxContainer;
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use model::{
    Chart, ChartType, Deck, DeckMetadata, DeckStats, Group, Image, MatchConfidence, MatchStrategy,
    Series, Slide, SlideImage, SlideNotes, SlideTable, TextBlock, TextKind,
};
pub use pptx::{ChartAssociation, Conversion, DeckConverter, NumericProximity};
pub use render::{ConvertOptions, JsonFormat};

use std::path::Path;

/// Convert a presentation file.
///
/// # Example
///
/// ```no_run
/// use unslide::{convert_file, ConvertOptions};
///
/// let options = ConvertOptions::default().with_notes(false);
/// let conversion = convert_file("deck.pptx", &options)?;
/// println!("{}", conversion.markdown);
/// # Ok::<(), unslide::Error>(())
/// ```
pub fn convert_file(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<Conversion> {
    DeckConverter::new(options.clone()).convert_file(path)
}

/// Convert a presentation held in memory.
///
/// `name` becomes the document heading.
pub fn convert_bytes(name: &str, data: Vec<u8>, options: &ConvertOptions) -> Result<Conversion> {
    DeckConverter::new(options.clone()).convert_bytes(name, data)
}

/// Extract the deck model without rendering.
pub fn extract_deck(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<Deck> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    detect::ensure_presentation(&data)?;
    let container = PptxContainer::from_bytes(data)?;
    DeckConverter::new(options.clone()).extract(&pptx::display_name(path), &container)
}

/// Convert a presentation to Markdown.
///
/// # Example
///
/// ```no_run
/// use unslide::to_markdown;
///
/// let markdown = to_markdown("deck.pptx")?;
/// std::fs::write("deck.md", markdown)?;
/// # Ok::<(), unslide::Error>(())
/// ```
pub fn to_markdown(path: impl AsRef<Path>) -> Result<String> {
    to_markdown_with_options(path, &ConvertOptions::default())
}

/// Convert a presentation to Markdown with options.
///
/// # Example
///
/// ```no_run
/// use unslide::{to_markdown_with_options, ConvertOptions};
///
/// let options = ConvertOptions::default()
///     .with_embedded_images(false)
///     .with_image_prefix("assets/");
///
/// let markdown = to_markdown_with_options("deck.pptx", &options)?;
/// # Ok::<(), unslide::Error>(())
/// ```
pub fn to_markdown_with_options(path: impl AsRef<Path>, options: &ConvertOptions) -> Result<String> {
    Ok(convert_file(path, options)?.markdown)
}

/// Convert a presentation file without blocking the async runtime.
///
/// The file is read with Tokio and the conversion runs on the blocking pool.
#[cfg(feature = "async")]
pub async fn convert_file_async(
    path: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<Conversion> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await?;
    let name = pptx::display_name(path);
    let converter = DeckConverter::new(options.clone());

    tokio::task::spawn_blocking(move || converter.convert_bytes(&name, data))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_zip, slide_xml, text_shape};

    #[test]
    fn test_convert_bytes() {
        let slide = slide_xml(&text_shape("Title 1", Some("ctrTitle"), &["Welcome"]));
        let data = build_zip(&[("ppt/slides/slide1.xml", slide.as_bytes())]);
        let conversion = convert_bytes("intro.pptx", data, &ConvertOptions::default()).unwrap();
        assert!(conversion.markdown.starts_with("# intro.pptx\n"));
        assert!(conversion.markdown.contains("### Welcome"));
    }

    #[test]
    fn test_convert_bytes_rejects_non_zip() {
        let result = convert_bytes("notes.txt", b"plain text".to_vec(), &ConvertOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_to_markdown_from_file() {
        let slide = slide_xml(&text_shape("Body", None, &["Hello from disk"]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.pptx");
        std::fs::write(&path, build_zip(&[("ppt/slides/slide1.xml", slide.as_bytes())])).unwrap();

        let markdown = to_markdown(&path).unwrap();
        assert!(markdown.starts_with("# disk.pptx\n"));
        assert!(markdown.contains("Hello from disk"));

        let deck = extract_deck(&path, &ConvertOptions::default()).unwrap();
        assert_eq!(deck.name, "disk.pptx");
        assert_eq!(deck.stats.slide_count, 1);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_convert_file_async() {
        let slide = slide_xml(&text_shape("Body", None, &["Async"]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("async.pptx");
        std::fs::write(&path, build_zip(&[("ppt/slides/slide1.xml", slide.as_bytes())])).unwrap();

        let conversion = convert_file_async(&path, &ConvertOptions::default())
            .await
            .unwrap();
        assert_eq!(conversion.deck.name, "async.pptx");
    }
}
