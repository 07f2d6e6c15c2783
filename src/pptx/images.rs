//! Image extraction and picture-to-slide correlation.
//!
//! Images are read from `media/image<N>.<ext>` up front. A second pass walks
//! every slide's `p:pic` elements and ties each picture to an extracted image
//! through three tiers: shape name, embed reference, then the first image not
//! yet seen on any slide. The last tier is a guess and is reported as such
//! through [`MatchConfidence::Low`](crate::model::MatchConfidence).

use super::slides::read_relationships;
use crate::container::PptxContainer;
use crate::encoding::format_size;
use crate::model::{Image, MatchStrategy, SlideImage};
use crate::render::cleanup::normalize_text;
use crate::xml::{self, Element, XmlTree};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;

/// What a slide says about one picture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PictureRef {
    /// `descr` of the picture's non-visual properties
    pub alt_text: String,
    /// `name` of the picture's non-visual properties
    pub shape_name: String,
    /// Relationship id of the embedded blip (`rId3`)
    pub embed_id: String,
    /// Relationship target of `embed_id`, when the slide's rels resolve it
    pub target: Option<String>,
}

/// Picture references in document order.
///
/// Pictures without non-visual properties carry nothing to match on and are
/// skipped.
pub fn find_pictures(root: &Element, relationships: &HashMap<String, String>) -> Vec<PictureRef> {
    xml::find_by_tag(root, "p:pic")
        .into_iter()
        .filter_map(|pic| {
            let props = xml::find_first(pic, "p:nvPicPr p:cNvPr")?;
            let embed_id = xml::find_first(pic, "a:blip")
                .and_then(|blip| blip.attr_tolerant("r:embed"))
                .unwrap_or_default()
                .to_string();
            Some(PictureRef {
                alt_text: normalize_text(props.attr("descr").unwrap_or_default()),
                shape_name: props.attr("name").unwrap_or_default().to_string(),
                target: relationships.get(&embed_id).cloned(),
                embed_id,
            })
        })
        .collect()
}

/// Pixel dimensions read from the payload header.
pub fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Aggregate figures over the extracted images.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageStats {
    pub total_images: usize,
    pub total_size: usize,
    /// `total_size` in human-readable form
    pub total_size_formatted: String,
    pub with_alt_text: usize,
    pub without_alt_text: usize,
    /// Image counts keyed by lowercase extension
    pub by_format: BTreeMap<String, usize>,
    pub slides_with_images: usize,
    /// Matches made by the first-unclaimed fallback
    pub low_confidence_matches: usize,
}

/// Extracts images and correlates them with slides.
#[derive(Debug, Default)]
pub struct ImageExtractor {
    images: Vec<Image>,
    slide_images: BTreeMap<u32, Vec<SlideImage>>,
}

impl ImageExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every media image, ordered by numeric suffix.
    ///
    /// Unreadable entries are logged and skipped. Undecodable payloads keep
    /// `0x0` dimensions.
    pub fn extract_all(&mut self, container: &PptxContainer) -> &[Image] {
        self.images.clear();
        self.slide_images.clear();

        for (ordinal, path) in container.image_entries() {
            let data = match container.read_binary(&path) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("{}: {}", path, e);
                    continue;
                }
            };

            let mut image = Image::new(format!("image{}", ordinal), path, data);
            match image_dimensions(&image.data) {
                Some((width, height)) => {
                    image.width = width;
                    image.height = height;
                }
                None => log::debug!("{}: dimensions not decodable", image.path),
            }
            self.images.push(image);
        }

        log::debug!("extracted {} images", self.images.len());
        &self.images
    }

    /// Correlate pictures on every slide with the extracted images.
    ///
    /// Slides are visited in increasing ordinal order, which matters for the
    /// first-unclaimed fallback. Unreadable or malformed slides are skipped.
    pub fn correlate(&mut self, container: &PptxContainer) {
        for (number, path) in container.slide_entries() {
            let xml = match container.read_xml(&path) {
                Ok(xml) => xml,
                Err(e) => {
                    log::warn!("{}: {}", path, e);
                    continue;
                }
            };
            let tree = XmlTree::parse(&xml);
            if let Some(err) = tree.error() {
                log::warn!("{}: skipped for image correlation: {}", path, err);
                continue;
            }
            let relationships = read_relationships(container, &path);
            let pictures = find_pictures(tree.document(), &relationships);
            self.correlate_slide(number, &pictures);
        }
    }

    /// Correlate one slide's pictures, returning the images placed on it.
    pub fn correlate_slide(&mut self, slide: u32, pictures: &[PictureRef]) -> &[SlideImage] {
        let mut placed = Vec::new();

        for picture in pictures {
            let Some((index, strategy)) = self.find_match(picture) else {
                log::debug!(
                    "slide {}: no image left for picture {:?}",
                    slide,
                    picture.shape_name
                );
                continue;
            };

            let image = &mut self.images[index];
            image.merge_slide_data(&picture.alt_text, &picture.shape_name);
            if image.add_slide(slide) {
                if strategy == MatchStrategy::FirstUnclaimed {
                    log::debug!("slide {}: {} placed by fallback", slide, image.id);
                }
                placed.push(SlideImage::new(image.id.clone(), strategy));
            }
        }

        let entry = self.slide_images.entry(slide).or_default();
        entry.extend(placed);
        entry.as_slice()
    }

    // Within a tier the longest matching identifier wins, so `image10` is
    // not claimed by `image1`.
    fn find_match(&self, picture: &PictureRef) -> Option<(usize, MatchStrategy)> {
        let shape_name = picture.shape_name.trim().to_lowercase();
        if !shape_name.is_empty() {
            if let Some(index) =
                self.best_match(|id| shape_name.contains(id) || id.contains(&shape_name))
            {
                return Some((index, MatchStrategy::ShapeName));
            }
        }

        let embed_id = picture.embed_id.trim().to_lowercase();
        let target = picture.target.as_deref().unwrap_or_default().to_lowercase();
        if !embed_id.is_empty() {
            if let Some(index) = self.best_match(|id| {
                embed_id.contains(id) || (!target.is_empty() && target.contains(id))
            }) {
                return Some((index, MatchStrategy::EmbedId));
            }
        }

        self.images
            .iter()
            .position(|image| !image.is_claimed())
            .map(|index| (index, MatchStrategy::FirstUnclaimed))
    }

    fn best_match(&self, matches: impl Fn(&str) -> bool) -> Option<usize> {
        self.images
            .iter()
            .enumerate()
            .filter(|(_, image)| matches(&image.id))
            .fold(None, |best: Option<(usize, usize)>, (index, image)| match best {
                Some((_, len)) if len >= image.id.len() => best,
                _ => Some((index, image.id.len())),
            })
            .map(|(index, _)| index)
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn image_by_id(&self, id: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.id == id)
    }

    /// Images placed on a slide, in picture order.
    pub fn images_for_slide(&self, slide: u32) -> &[SlideImage] {
        self.slide_images
            .get(&slide)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Images as `(filename, payload)` pairs.
    pub fn export(&self) -> Vec<(String, Vec<u8>)> {
        self.images
            .iter()
            .map(|i| (i.filename.clone(), i.data.clone()))
            .collect()
    }

    pub fn stats(&self) -> ImageStats {
        let total_size = self.images.iter().map(|i| i.size).sum();
        let with_alt_text = self.images.iter().filter(|i| i.has_alt_text()).count();
        let mut by_format = BTreeMap::new();
        for image in &self.images {
            *by_format.entry(image.extension()).or_insert(0) += 1;
        }

        ImageStats {
            total_images: self.images.len(),
            total_size,
            total_size_formatted: format_size(total_size),
            with_alt_text,
            without_alt_text: self.images.len() - with_alt_text,
            by_format,
            slides_with_images: self.slide_images.values().filter(|v| !v.is_empty()).count(),
            low_confidence_matches: self
                .slide_images
                .values()
                .flatten()
                .filter(|s| s.matched_by == MatchStrategy::FirstUnclaimed)
                .count(),
        }
    }

    /// Hand over the images and the slide map.
    pub fn into_parts(self) -> (Vec<Image>, BTreeMap<u32, Vec<SlideImage>>) {
        (self.images, self.slide_images)
    }
}
