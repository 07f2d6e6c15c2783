//! Conversion options configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for converting a deck.
///
/// Every field has a default, so a partial JSON document is a valid
/// configuration:
///
/// ```
/// use unslide::ConvertOptions;
///
/// let options = ConvertOptions::from_json_str(r#"{ "embed_images": false }"#)?;
/// assert!(!options.embed_images);
/// assert!(options.extract_charts);
/// # Ok::<(), unslide::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Extract media images and list them under each slide
    pub extract_images: bool,

    /// Extract charts and render their data as tables
    pub extract_charts: bool,

    /// Include speaker notes
    pub include_notes: bool,

    /// Process grouped shapes (statistics only)
    pub handle_groups: bool,

    /// Embed image payloads as `data:` URIs instead of file references
    pub embed_images: bool,

    /// Prefix for image file references (e.g., "assets/")
    pub image_path_prefix: String,

    /// Emit `<!-- Slide N -->` markers and `## Slide N` headings
    pub include_slide_numbers: bool,

    /// Emit the metadata header and the statistics footer
    pub include_metadata: bool,

    /// Mark images placed by the first-unclaimed fallback with a comment
    pub annotate_low_confidence: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            extract_images: true,
            extract_charts: true,
            include_notes: true,
            handle_groups: true,
            embed_images: true,
            image_path_prefix: String::new(),
            include_slide_numbers: true,
            include_metadata: true,
            annotate_low_confidence: false,
        }
    }
}

impl ConvertOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidData(format!("options: {}", e)))
    }

    /// Read options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Enable or disable chart extraction.
    pub fn with_charts(mut self, extract: bool) -> Self {
        self.extract_charts = extract;
        self
    }

    /// Enable or disable speaker notes.
    pub fn with_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }

    /// Enable or disable grouped-shape processing.
    pub fn with_groups(mut self, handle: bool) -> Self {
        self.handle_groups = handle;
        self
    }

    /// Embed images as `data:` URIs (`true`) or reference them by file name.
    pub fn with_embedded_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }

    /// Set the prefix for image file references.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Enable or disable slide-number headings.
    pub fn with_slide_numbers(mut self, include: bool) -> Self {
        self.include_slide_numbers = include;
        self
    }

    /// Enable or disable the metadata header and statistics footer.
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Enable or disable low-confidence image annotations.
    pub fn with_low_confidence_annotations(mut self, annotate: bool) -> Self {
        self.annotate_low_confidence = annotate;
        self
    }
}
