//! Grouped-shape model.

use serde::Serialize;

/// Texts of a group's child shapes in reading order (top, then left).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Group {
    /// Slide the group was found on
    pub slide: u32,
    /// Number of direct child shapes, including those without text
    pub shape_count: usize,
    /// Non-empty child texts in spatial order
    pub texts: Vec<String>,
}

impl Group {
    /// All child texts joined with single spaces.
    pub fn combined_text(&self) -> String {
        self.texts.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_text() {
        let group = Group {
            slide: 1,
            shape_count: 3,
            texts: vec!["Top".to_string(), "Bottom".to_string()],
        };
        assert_eq!(group.combined_text(), "Top Bottom");
        assert!(!group.is_empty());
        assert!(Group::default().is_empty());
    }
}
