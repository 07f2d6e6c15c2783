//! Deck orchestration.
//!
//! Runs the extractors over one container in a fixed order: images, image
//! correlation and charts up front, then one pass over the slides in
//! increasing ordinal order. Each run owns its extractors and their caches.

use super::association::{ChartAssociation, NumericProximity};
use super::charts::ChartExtractor;
use super::groups::GroupHandler;
use super::images::ImageExtractor;
use super::notes::NotesExtractor;
use super::slides::parse_slide_content;
use crate::container::PptxContainer;
use crate::error::{Error, Result};
use crate::model::{Deck, DeckStats, Slide};
use crate::render::{self, ConvertOptions};
use crate::xml::XmlTree;
use std::path::Path;
use std::time::Instant;

/// Result of a conversion: the extracted deck and its Markdown.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub deck: Deck,
    pub markdown: String,
}

/// Converts presentations to [`Deck`]s and Markdown.
///
/// # Example
///
/// ```no_run
/// use unslide::{ConvertOptions, DeckConverter};
///
/// let converter = DeckConverter::new(ConvertOptions::default().with_embedded_images(false));
/// let conversion = converter.convert_file("deck.pptx")?;
/// println!("{} slides", conversion.deck.stats.slide_count);
/// std::fs::write("deck.md", conversion.markdown)?;
/// # Ok::<(), unslide::Error>(())
/// ```
pub struct DeckConverter {
    options: ConvertOptions,
    association: Box<dyn ChartAssociation + Send + Sync>,
}

impl Default for DeckConverter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl std::fmt::Debug for DeckConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckConverter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DeckConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            association: Box::new(NumericProximity::default()),
        }
    }

    /// Replace the chart-to-slide association.
    pub fn with_association(mut self, association: impl ChartAssociation + Send + Sync + 'static) -> Self {
        self.association = Box::new(association);
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a file on disk; the file name becomes the document heading.
    pub fn convert_file(&self, path: impl AsRef<Path>) -> Result<Conversion> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        self.convert_bytes(&display_name(path), data)
    }

    /// Convert an in-memory package.
    pub fn convert_bytes(&self, name: &str, data: Vec<u8>) -> Result<Conversion> {
        crate::detect::ensure_presentation(&data)?;
        let container = PptxContainer::from_bytes(data)?;
        self.convert(name, &container)
    }

    /// Extract a deck and render it.
    pub fn convert(&self, name: &str, container: &PptxContainer) -> Result<Conversion> {
        let deck = self.extract(name, container)?;
        let markdown = render::to_markdown(&deck, &self.options)?;
        Ok(Conversion { deck, markdown })
    }

    /// Extract every enabled component of a deck.
    ///
    /// Fails only when the container has no slide entries. Unreadable slides
    /// are kept as empty, failed slides; other per-part failures are logged
    /// and skipped.
    pub fn extract(&self, name: &str, container: &PptxContainer) -> Result<Deck> {
        let started = Instant::now();
        let options = &self.options;

        let slide_entries = container.slide_entries();
        if slide_entries.is_empty() {
            return Err(Error::MissingComponent(
                "no ppt/slides/slide<N>.xml entries".to_string(),
            ));
        }
        log::debug!("{}: {} slides", name, slide_entries.len());

        let metadata = container.parse_core_metadata();

        let mut images = ImageExtractor::new();
        if options.extract_images {
            images.extract_all(container);
            images.correlate(container);
        }

        let mut charts = ChartExtractor::new();
        if options.extract_charts {
            charts.extract_all(container);
        }

        let mut notes = NotesExtractor::new(container);
        let mut groups = GroupHandler::new();
        let mut slides = Vec::with_capacity(slide_entries.len());

        for (number, path) in slide_entries {
            let mut slide = Slide::new(number, &path);

            let tree = match container.read_xml(&path) {
                Ok(xml) => Some(XmlTree::parse(&xml)),
                Err(e) => {
                    log::warn!("{}: {}", path, e);
                    None
                }
            };
            let root = match tree {
                Some(ref tree) if tree.is_malformed() => {
                    log::warn!(
                        "{}: malformed markup: {}",
                        path,
                        tree.error().unwrap_or_default()
                    );
                    None
                }
                Some(ref tree) => Some(tree.document()),
                None => None,
            };

            match root {
                Some(root) => {
                    let content = parse_slide_content(root);
                    slide.blocks = content.blocks;
                    slide.tables = content.tables;
                }
                None => slide.failed = true,
            }

            slide.images = images.images_for_slide(number).to_vec();
            if options.extract_charts {
                slide.charts = self.association.charts_for_slide(charts.charts(), number);
            }
            if options.include_notes {
                slide.notes = notes.extract_for_slide(number);
            }
            if let (true, Some(root)) = (options.handle_groups, root) {
                slide.groups = groups.process_slide(number, root).to_vec();
            }

            slides.push(slide);
        }

        let image_stats = images.stats();
        let group_stats = groups.stats();
        let (images, _) = images.into_parts();
        let charts = charts.into_charts();

        let stats = DeckStats {
            slide_count: slides.len(),
            image_count: images.len(),
            chart_count: charts.len(),
            notes_count: slides.iter().filter(|s| s.notes.is_some()).count(),
            group_count: group_stats.total_groups,
            grouped_shape_count: group_stats.total_shapes,
            failed_slides: slides.iter().filter(|s| s.failed).count(),
            low_confidence_matches: image_stats.low_confidence_matches,
            elapsed_ms: started.elapsed().as_millis(),
        };
        log::debug!("{}: extracted in {}ms", name, stats.elapsed_ms);

        Ok(Deck {
            name: name.to_string(),
            metadata,
            slides,
            images,
            charts,
            stats,
        })
    }
}

/// File name of a path, for use as a document heading.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
