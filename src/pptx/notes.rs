//! Speaker-notes extraction.
//!
//! Notes for slide `N` live in `notesSlides/notesSlide<N>.xml`. Results are
//! memoized per ordinal for the lifetime of the extractor, including the
//! "no notes" outcome.

use crate::container::PptxContainer;
use crate::error::{Error, Result};
use crate::model::SlideNotes;
use crate::render::cleanup::normalize_text;
use crate::xml::{self, XmlTree};
use serde::Serialize;
use std::collections::BTreeMap;

/// Runs this short are layout artifacts (slide numbers, bullets) once a
/// notes page has more than [`KEEP_ALL_RUNS`] runs.
const MIN_RUN_CHARS: usize = 4;

/// Pages with at most this many runs are kept whole.
const KEEP_ALL_RUNS: usize = 2;

/// One slide's hits from [`NotesExtractor::search`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotesMatch {
    pub slide_number: u32,
    pub notes: String,
    /// Non-overlapping occurrences of the search text
    pub matches: usize,
}

/// Aggregate figures over the notes resolved so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotesStats {
    /// Slides checked for notes
    pub total_slides: usize,
    pub slides_with_notes: usize,
    pub slides_without_notes: usize,
    pub total_characters: usize,
    pub total_words: usize,
    pub average_length: f64,
    pub shortest_notes: usize,
    pub longest_notes: usize,
}

/// Extracts and caches speaker notes.
#[derive(Debug)]
pub struct NotesExtractor<'a> {
    container: &'a PptxContainer,
    paths: BTreeMap<u32, String>,
    cache: BTreeMap<u32, Option<String>>,
    parses: usize,
}

impl<'a> NotesExtractor<'a> {
    pub fn new(container: &'a PptxContainer) -> Self {
        let paths: BTreeMap<u32, String> = container.notes_entries().into_iter().collect();
        log::debug!("found {} notes pages", paths.len());
        Self {
            container,
            paths,
            cache: BTreeMap::new(),
            parses: 0,
        }
    }

    /// Notes for a slide, `None` when it has none.
    ///
    /// The first call per ordinal reads the notes page; later calls are
    /// answered from the cache.
    pub fn extract_for_slide(&mut self, slide: u32) -> Option<String> {
        if let Some(cached) = self.cache.get(&slide) {
            return cached.clone();
        }

        let notes = match self.paths.get(&slide) {
            Some(path) => {
                self.parses += 1;
                self.container
                    .read_xml(path)
                    .and_then(|xml| parse_notes(&xml))
                    .unwrap_or_else(|e| {
                        log::warn!("{}: {}", path, e);
                        None
                    })
            }
            None => None,
        };

        self.cache.insert(slide, notes.clone());
        notes
    }

    /// Notes for slides `1..=total`, one entry per slide.
    pub fn extract_all(&mut self, total: u32) -> Vec<SlideNotes> {
        let all: Vec<SlideNotes> = (1..=total).map(|n| self.slide_notes(n)).collect();
        log::debug!(
            "notes found on {}/{} slides",
            all.iter().filter(|n| n.has_notes).count(),
            total
        );
        all
    }

    /// Notes for the given slides, in the order requested.
    pub fn extract_for_slides(&mut self, slides: &[u32]) -> Vec<SlideNotes> {
        slides.iter().map(|&n| self.slide_notes(n)).collect()
    }

    fn slide_notes(&mut self, slide: u32) -> SlideNotes {
        let notes = self.extract_for_slide(slide);
        SlideNotes {
            slide_number: slide,
            has_notes: notes.is_some(),
            notes,
        }
    }

    pub fn has_notes(&mut self, slide: u32) -> bool {
        self.extract_for_slide(slide).is_some()
    }

    /// Count occurrences of `needle` in every cached note.
    ///
    /// Only slides already resolved are searched. The needle is matched
    /// literally.
    pub fn search(&self, needle: &str, case_sensitive: bool) -> Vec<NotesMatch> {
        if needle.is_empty() {
            return Vec::new();
        }
        let pattern = if case_sensitive {
            needle.to_string()
        } else {
            needle.to_lowercase()
        };

        self.cached_notes()
            .filter_map(|(slide_number, notes)| {
                let haystack = if case_sensitive {
                    notes.to_string()
                } else {
                    notes.to_lowercase()
                };
                let matches = haystack.matches(pattern.as_str()).count();
                (matches > 0).then(|| NotesMatch {
                    slide_number,
                    notes: notes.to_string(),
                    matches,
                })
            })
            .collect()
    }

    pub fn stats(&self) -> NotesStats {
        let lengths: Vec<usize> = self
            .cached_notes()
            .map(|(_, notes)| notes.chars().count())
            .collect();
        let total_characters: usize = lengths.iter().sum();
        let total_words = self
            .cached_notes()
            .map(|(_, notes)| notes.split_whitespace().count())
            .sum();

        NotesStats {
            total_slides: self.cache.len(),
            slides_with_notes: lengths.len(),
            slides_without_notes: self.cache.len() - lengths.len(),
            total_characters,
            total_words,
            average_length: if lengths.is_empty() {
                0.0
            } else {
                total_characters as f64 / lengths.len() as f64
            },
            shortest_notes: lengths.iter().copied().min().unwrap_or(0),
            longest_notes: lengths.iter().copied().max().unwrap_or(0),
        }
    }

    /// Plain-text dump of every cached note, in slide order.
    pub fn export_all(&self) -> String {
        self.cached_notes()
            .map(|(slide, notes)| format!("Slide {}:\n{}\n", slide, notes))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Notes pages read so far, cache hits excluded.
    pub fn parse_count(&self) -> usize {
        self.parses
    }

    fn cached_notes(&self) -> impl Iterator<Item = (u32, &str)> {
        self.cache
            .iter()
            .filter_map(|(slide, notes)| notes.as_deref().map(|n| (*slide, n)))
    }
}

/// Text of a notes page after dropping the title echo and short artifacts.
pub fn parse_notes(xml: &str) -> Result<Option<String>> {
    let tree = XmlTree::parse(xml);
    if let Some(err) = tree.error() {
        return Err(Error::XmlParse(err.to_string()));
    }

    // Blank runs count towards the limit, then drop out.
    let runs: Vec<String> = xml::find_by_tag(tree.document(), "a:t")
        .into_iter()
        .map(|run| run.text().trim().to_string())
        .collect();
    let kept: Vec<String> = if runs.len() <= KEEP_ALL_RUNS {
        runs.into_iter().filter(|run| !run.is_empty()).collect()
    } else {
        runs.into_iter()
            .skip(1)
            .filter(|run| run.chars().count() >= MIN_RUN_CHARS)
            .collect()
    };

    let notes = normalize_text(kept.join(" ").trim());
    Ok((!notes.is_empty()).then_some(notes))
}
