//! Chart model structures.

use serde::Serialize;

/// Chart kind, detected from the plot-area element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Area,
    Scatter,
    Radar,
    Doughnut,
    Bubble,
    Unknown,
}

impl ChartType {
    /// Detection order. When a chart carries two plot types, the earlier one
    /// in this list wins.
    pub const DETECTION_ORDER: [ChartType; 8] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Area,
        ChartType::Scatter,
        ChartType::Radar,
        ChartType::Doughnut,
        ChartType::Bubble,
    ];

    /// Plot-area tags that identify this type.
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            ChartType::Bar => &["c:barChart", "c:bar3DChart"],
            ChartType::Line => &["c:lineChart", "c:line3DChart"],
            ChartType::Pie => &["c:pieChart", "c:pie3DChart", "c:ofPieChart"],
            ChartType::Area => &["c:areaChart", "c:area3DChart"],
            ChartType::Scatter => &["c:scatterChart"],
            ChartType::Radar => &["c:radarChart"],
            ChartType::Doughnut => &["c:doughnutChart"],
            ChartType::Bubble => &["c:bubbleChart"],
            ChartType::Unknown => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Area => "area",
            ChartType::Scatter => "scatter",
            ChartType::Radar => "radar",
            ChartType::Doughnut => "doughnut",
            ChartType::Bubble => "bubble",
            ChartType::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ChartType::Unknown)
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named sequence of values within a chart.
///
/// Positions align with the chart's categories, so values are never dropped:
/// anything that fails to parse is stored as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Series name (legend label)
    pub name: String,
    /// Data values
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Chart extracted from `charts/chart<N>.xml`.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    /// Identifier derived from the file name (`chart3`)
    pub id: String,
    /// Numeric suffix of the file name
    pub ordinal: u32,
    /// Archive path the chart was read from
    pub path: String,
    /// Chart title, `"Chart"` when none could be recovered
    pub title: String,
    /// Detected chart type
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// Series with at least one value
    pub series: Vec<Series>,
    /// Category labels (explicit or synthesized)
    pub categories: Vec<String>,
}

impl Chart {
    /// Longest value sequence across all series.
    ///
    /// This is the number of data rows the chart renders to.
    pub fn data_points_count(&self) -> usize {
        self.series.iter().map(|s| s.values.len()).max().unwrap_or(0)
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Category label for a row, `Row N` past the end of the labels.
    pub fn category_label(&self, index: usize) -> String {
        self.categories
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Row {}", index + 1))
    }

    /// Formatted cell for a series at a row; empty when the series is shorter.
    pub fn cell(&self, series: usize, index: usize) -> String {
        self.series
            .get(series)
            .and_then(|s| s.values.get(index))
            .map(|v| format_number(*v))
            .unwrap_or_default()
    }
}

/// Format a number, removing unnecessary trailing zeros.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        let s = format!("{:.6}", n);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(series: Vec<Series>) -> Chart {
        Chart {
            id: "chart1".to_string(),
            ordinal: 1,
            path: "ppt/charts/chart1.xml".to_string(),
            title: "Chart".to_string(),
            chart_type: ChartType::Bar,
            series,
            categories: vec!["Q1".to_string()],
        }
    }

    #[test]
    fn test_data_points_count_uses_longest_series() {
        let c = chart(vec![
            Series::new("A", vec![1.0, 2.0, 3.0]),
            Series::new("B", vec![4.0, 5.0]),
        ]);
        assert_eq!(c.data_points_count(), 3);
        assert_eq!(c.series_count(), 2);
    }

    #[test]
    fn test_missing_cell_is_empty_not_zero() {
        let c = chart(vec![
            Series::new("A", vec![1.0, 0.0, 3.0]),
            Series::new("B", vec![4.0, 5.0]),
        ]);
        assert_eq!(c.cell(0, 1), "0");
        assert_eq!(c.cell(1, 2), "");
    }

    #[test]
    fn test_category_label_fallback() {
        let c = chart(vec![Series::new("A", vec![1.0, 2.0])]);
        assert_eq!(c.category_label(0), "Q1");
        assert_eq!(c.category_label(1), "Row 2");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(8.3), "8.3");
        assert_eq!(format_number(12.345678), "12.345678");
        assert_eq!(format_number(-2.5), "-2.5");
    }

    #[test]
    fn test_chart_type_names() {
        assert_eq!(ChartType::Doughnut.to_string(), "doughnut");
        assert!(ChartType::Unknown.is_unknown());
        assert!(ChartType::Unknown.tags().is_empty());
    }
}
