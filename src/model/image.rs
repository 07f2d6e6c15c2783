//! Image model structures.

use serde::Serialize;
use std::collections::BTreeSet;

/// Which correlation tier matched a picture to an extracted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Shape name and image identifier contain one another
    ShapeName,
    /// Embed relationship id contains the image identifier
    EmbedId,
    /// First image not yet seen on any slide (last resort)
    FirstUnclaimed,
}

impl MatchStrategy {
    pub fn confidence(&self) -> MatchConfidence {
        match self {
            MatchStrategy::ShapeName => MatchConfidence::High,
            MatchStrategy::EmbedId => MatchConfidence::Medium,
            MatchStrategy::FirstUnclaimed => MatchConfidence::Low,
        }
    }
}

/// How much a picture/image association can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    Low,
    Medium,
    High,
}

/// An image placed on a slide, pointing into the deck's image set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideImage {
    /// Identifier of the matched [`Image`]
    pub image_id: String,
    /// Tier that produced the match
    pub matched_by: MatchStrategy,
    /// Confidence derived from the tier
    pub confidence: MatchConfidence,
}

impl SlideImage {
    pub fn new(image_id: impl Into<String>, matched_by: MatchStrategy) -> Self {
        Self {
            image_id: image_id.into(),
            matched_by,
            confidence: matched_by.confidence(),
        }
    }
}

/// An image extracted from `media/image<N>.<ext>`.
#[derive(Debug, Clone, Serialize)]
pub struct Image {
    /// Canonical lowercase identifier (`image7`); never changes once set
    pub id: String,
    /// File name inside the archive (`image7.png`)
    pub filename: String,
    /// Full archive path
    pub path: String,
    /// MIME type inferred from the extension
    pub mime_type: String,
    /// Raw payload
    #[serde(skip)]
    pub data: Vec<u8>,
    /// Size in bytes
    pub size: usize,
    /// Pixel width, 0 when undeterminable
    pub width: u32,
    /// Pixel height, 0 when undeterminable
    pub height: u32,
    /// Alternative text, defaults to the file name
    pub alt_text: String,
    /// Shape name from the slide, defaults to the file name
    pub shape_name: String,
    /// Slides the image was correlated with
    pub slides: BTreeSet<u32>,
}

impl Image {
    pub fn new(id: impl Into<String>, path: impl Into<String>, data: Vec<u8>) -> Self {
        let path = path.into();
        let filename = path.rsplit('/').next().unwrap_or(&path).to_string();
        let mime_type = crate::encoding::mime_type_for(&filename).to_string();
        Self {
            id: id.into(),
            size: data.len(),
            data,
            mime_type,
            width: 0,
            height: 0,
            alt_text: filename.clone(),
            shape_name: filename.clone(),
            slides: BTreeSet::new(),
            filename,
            path,
        }
    }

    /// Merge descriptive data found on a slide.
    ///
    /// A field is only overwritten by a non-empty value, so a resolved alt
    /// text never reverts to the default.
    pub fn merge_slide_data(&mut self, alt_text: &str, shape_name: &str) {
        let alt_text = alt_text.trim();
        if !alt_text.is_empty() {
            self.alt_text = alt_text.to_string();
        }
        let shape_name = shape_name.trim();
        if !shape_name.is_empty() {
            self.shape_name = shape_name.to_string();
        }
    }

    /// Record that the image appears on a slide. Returns `false` if the
    /// ordinal was already present.
    pub fn add_slide(&mut self, slide: u32) -> bool {
        self.slides.insert(slide)
    }

    /// Whether the image has been correlated with any slide.
    pub fn is_claimed(&self) -> bool {
        !self.slides.is_empty()
    }

    /// Whether the alt text came from the deck rather than the file name.
    pub fn has_alt_text(&self) -> bool {
        !self.alt_text.is_empty() && self.alt_text != self.filename
    }

    /// Lowercase file extension.
    pub fn extension(&self) -> String {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Self-contained `data:` URI for the payload.
    pub fn data_uri(&self) -> String {
        crate::encoding::data_uri(&self.mime_type, &self.data)
    }
}
