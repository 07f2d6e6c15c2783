//! Grouped-shape handling.
//!
//! Every `p:grpSp` on a slide becomes a [`Group`] whose texts follow the
//! spatial order of its direct child shapes: top to bottom, then left to
//! right, in EMU as stored.

use crate::model::Group;
use crate::xml::{self, Element};
use serde::Serialize;

/// Aggregate figures over the processed groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub total_groups: usize,
    pub total_shapes: usize,
    pub total_texts: usize,
    pub average_shapes_per_group: f64,
}

/// Offset of a shape's transform, `(0, 0)` when absent or unparsable.
pub fn shape_position(shape: &Element) -> (i64, i64) {
    let Some(offset) = xml::find_first(shape, "p:spPr a:xfrm a:off") else {
        return (0, 0);
    };
    let coord = |name: &str| {
        offset
            .attr(name)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
    };
    (coord("x"), coord("y"))
}

/// Text of one shape: all runs joined by single spaces.
pub fn shape_text(shape: &Element) -> String {
    xml::texts(shape, "a:t").join(" ")
}

/// Collects groups across the slides of one deck.
#[derive(Debug, Default)]
pub struct GroupHandler {
    groups: Vec<Group>,
    total_shapes: usize,
}

impl GroupHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process every group on a parsed slide and return the new groups.
    pub fn process_slide(&mut self, slide: u32, root: &Element) -> &[Group] {
        let start = self.groups.len();
        for group in xml::find_by_tag(root, "p:grpSp") {
            let processed = process_group(slide, group);
            self.total_shapes += processed.shape_count;
            self.groups.push(processed);
        }
        log::debug!("slide {}: {} groups", slide, self.groups.len() - start);
        &self.groups[start..]
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn stats(&self) -> GroupStats {
        GroupStats {
            total_groups: self.groups.len(),
            total_shapes: self.total_shapes,
            total_texts: self.groups.iter().map(|g| g.texts.len()).sum(),
            average_shapes_per_group: if self.groups.is_empty() {
                0.0
            } else {
                self.total_shapes as f64 / self.groups.len() as f64
            },
        }
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.total_shapes = 0;
    }
}

/// Build a group from its direct child shapes.
pub fn process_group(slide: u32, group: &Element) -> Group {
    let mut shapes: Vec<((i64, i64), &Element)> = xml::children_by_tag(group, "p:sp")
        .into_iter()
        .map(|shape| {
            let (x, y) = shape_position(shape);
            ((y, x), shape)
        })
        .collect();
    // Stable, so shapes at the same spot keep document order.
    shapes.sort_by_key(|(key, _)| *key);

    Group {
        slide,
        shape_count: shapes.len(),
        texts: shapes
            .iter()
            .map(|(_, shape)| shape_text(shape))
            .filter(|text| !text.is_empty())
            .collect(),
    }
}
