//! Chart-to-slide association.
//!
//! Chart parts are not tied to slides by name, so which charts render under
//! which slide is decided by a [`ChartAssociation`]. The default,
//! [`NumericProximity`], compares the chart's file ordinal with the slide's.

use crate::model::Chart;

/// Decides whether a chart belongs under a slide.
pub trait ChartAssociation {
    fn is_associated(&self, chart: &Chart, slide: u32) -> bool;

    /// Ids of the charts associated with a slide, in chart order.
    fn charts_for_slide(&self, charts: &[Chart], slide: u32) -> Vec<String> {
        charts
            .iter()
            .filter(|chart| self.is_associated(chart, slide))
            .map(|chart| chart.id.clone())
            .collect()
    }
}

/// Associates a chart with every slide whose ordinal is within `tolerance`
/// of the chart's ordinal.
///
/// A chart can therefore render under more than one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericProximity {
    pub tolerance: u32,
}

impl Default for NumericProximity {
    fn default() -> Self {
        Self { tolerance: 1 }
    }
}

impl ChartAssociation for NumericProximity {
    fn is_associated(&self, chart: &Chart, slide: u32) -> bool {
        chart.ordinal.abs_diff(slide) <= self.tolerance
    }
}
