//! Chart extraction.
//!
//! Reads every `charts/chart<N>.xml` part and turns its cached series data
//! into [`Chart`] records ready for tabular rendering.

use crate::container::PptxContainer;
use crate::error::{Error, Result};
use crate::model::{Chart, ChartType, Series};
use crate::render::cleanup::normalize_text;
use crate::xml::{self, Element, XmlTree};
use serde::Serialize;
use std::collections::BTreeMap;

/// Title locations inside the chart's own `c:title`, tried in order.
const TITLE_SELECTORS: &[&str] = &["c:tx c:rich a:p", "c:tx c:strRef c:strCache c:pt c:v"];

/// Fallback title when the chart has no title of its own.
pub const DEFAULT_TITLE: &str = "Chart";

const SERIES_NAME_SELECTORS: &[&str] = &["c:tx c:v", "c:tx c:strRef c:strCache c:pt c:v"];

/// Value caches, tried in order.
const VALUE_SOURCES: &[&str] = &[
    "c:val c:numRef c:numCache",
    "c:val c:numLit",
    "c:yVal c:numRef c:numCache",
    "c:yVal c:numLit",
];

/// Category caches, tried in order. Multi-level categories use their first
/// (innermost) level.
const CATEGORY_SOURCES: &[&str] = &[
    "c:cat c:strRef c:strCache",
    "c:cat c:numRef c:numCache",
    "c:cat c:strLit",
    "c:cat c:numLit",
    "c:cat c:multiLvlStrRef c:multiLvlStrCache c:lvl",
    "c:xVal c:strRef c:strCache",
    "c:xVal c:numRef c:numCache",
    "c:xVal c:strLit",
    "c:xVal c:numLit",
];

/// Points at or beyond this index are ignored.
const MAX_POINTS: usize = 1 << 16;

/// Aggregate figures over the extracted charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartStats {
    pub total_charts: usize,
    pub by_type: BTreeMap<ChartType, usize>,
    pub total_series: usize,
    /// Sum of every series' value count
    pub total_data_points: usize,
    pub average_series_per_chart: f64,
}

/// Extracts charts from a presentation container.
#[derive(Debug, Default)]
pub struct ChartExtractor {
    charts: Vec<Chart>,
}

impl ChartExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract every chart, ordered by the numeric suffix of its part name.
    ///
    /// A chart that cannot be read or parsed is logged and skipped, as is a
    /// chart without any series values.
    pub fn extract_all(&mut self, container: &PptxContainer) -> &[Chart] {
        self.charts.clear();

        for (ordinal, path) in container.chart_entries() {
            let id = format!("chart{}", ordinal);
            let parsed = container
                .read_xml(&path)
                .and_then(|xml| parse_chart(&id, ordinal, &path, &xml));
            match parsed {
                Ok(Some(chart)) => self.charts.push(chart),
                Ok(None) => log::debug!("{}: no series values, skipped", path),
                Err(e) => log::warn!("{}: {}", path, e),
            }
        }

        log::debug!("extracted {} charts", self.charts.len());
        &self.charts
    }

    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    pub fn into_charts(self) -> Vec<Chart> {
        self.charts
    }

    pub fn chart_by_id(&self, id: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.id == id)
    }

    pub fn stats(&self) -> ChartStats {
        let mut by_type = BTreeMap::new();
        for chart in &self.charts {
            *by_type.entry(chart.chart_type).or_insert(0) += 1;
        }
        let total_series: usize = self.charts.iter().map(Chart::series_count).sum();
        let total_data_points = self
            .charts
            .iter()
            .flat_map(|c| c.series.iter())
            .map(|s| s.values.len())
            .sum();
        let average_series_per_chart = if self.charts.is_empty() {
            0.0
        } else {
            total_series as f64 / self.charts.len() as f64
        };

        ChartStats {
            total_charts: self.charts.len(),
            by_type,
            total_series,
            total_data_points,
            average_series_per_chart,
        }
    }

    /// One chart as pretty-printed JSON, `None` for an unknown id.
    pub fn chart_json(&self, id: &str) -> Result<Option<String>> {
        self.chart_by_id(id)
            .map(serde_json::to_string_pretty)
            .transpose()
            .map_err(Error::from)
    }

    /// All charts as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.charts)?)
    }
}

/// Parse one chart part.
///
/// Returns `Ok(None)` when the chart has no series with values.
pub fn parse_chart(id: &str, ordinal: u32, path: &str, xml: &str) -> Result<Option<Chart>> {
    let tree = XmlTree::parse(xml);
    if let Some(err) = tree.error() {
        return Err(Error::XmlParse(err.to_string()));
    }
    let root = tree.document();

    let mut series = Vec::new();
    let mut categories: Option<Vec<String>> = None;
    for (position, ser) in xml::find_by_tag(root, "c:ser").into_iter().enumerate() {
        let values: Vec<f64> = cached_points(ser, VALUE_SOURCES)
            .into_iter()
            .map(|point| {
                point
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|n| n.is_finite())
                    .unwrap_or(0.0)
            })
            .collect();
        if values.is_empty() {
            continue;
        }

        if categories.is_none() {
            let labels = cached_points(ser, CATEGORY_SOURCES);
            if !labels.is_empty() {
                categories = Some(labels.into_iter().map(Option::unwrap_or_default).collect());
            }
        }

        let name = xml::first_text(ser, SERIES_NAME_SELECTORS)
            .map(|n| normalize_text(&n))
            .unwrap_or_else(|| format!("Series {}", position + 1));
        series.push(Series::new(name, values));
    }

    if series.is_empty() {
        return Ok(None);
    }

    let categories = categories.unwrap_or_else(|| {
        let rows = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
        (1..=rows).map(|i| format!("Category {}", i)).collect()
    });

    Ok(Some(Chart {
        id: id.to_string(),
        ordinal,
        path: path.to_string(),
        title: chart_title(root),
        chart_type: detect_chart_type(root),
        series,
        categories,
    }))
}

// Only the `c:title` directly under `c:chart`; axis titles live deeper.
fn chart_title(root: &Element) -> String {
    let Some(title) = xml::find_first(root, "c:chart")
        .and_then(|chart| xml::children_by_tag(chart, "c:title").into_iter().next())
    else {
        return DEFAULT_TITLE.to_string();
    };

    TITLE_SELECTORS
        .iter()
        .map(|selector| {
            let parts: Vec<String> = xml::find_by_tag(title, selector)
                .iter()
                .map(|el| el.text())
                .collect();
            normalize_text(parts.join(" ").trim())
        })
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// First type in detection order whose plot element is present.
pub fn detect_chart_type(root: &Element) -> ChartType {
    ChartType::DETECTION_ORDER
        .into_iter()
        .find(|t| t.tags().iter().any(|tag| xml::exists(root, tag)))
        .unwrap_or(ChartType::Unknown)
}

/// Point texts of the first non-empty cache, placed by their `idx`.
///
/// The result is as long as the cache's `c:ptCount` or the highest index
/// plus one, whichever is larger. Positions without a point are `None`.
fn cached_points(scope: &Element, sources: &[&str]) -> Vec<Option<String>> {
    sources
        .iter()
        .filter_map(|source| xml::find_first(scope, source))
        .find_map(|cache| {
            let pts = xml::children_by_tag(cache, "c:pt");
            if pts.is_empty() {
                return None;
            }

            let declared = xml::children_by_tag(cache, "c:ptCount")
                .first()
                .and_then(|count| count.attr("val"))
                .and_then(|val| val.trim().parse::<usize>().ok())
                .unwrap_or(0)
                .min(MAX_POINTS);

            let mut points: Vec<Option<String>> = vec![None; declared];
            for (position, pt) in pts.into_iter().enumerate() {
                let idx = pt
                    .attr("idx")
                    .and_then(|idx| idx.trim().parse::<usize>().ok())
                    .unwrap_or(position);
                if idx >= MAX_POINTS {
                    continue;
                }
                if points.len() <= idx {
                    points.resize(idx + 1, None);
                }
                let text = xml::find_first(pt, "c:v")
                    .map(|v| v.text().trim().to_string())
                    .unwrap_or_default();
                points[idx] = Some(text);
            }
            Some(points)
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_zip, NS_A, NS_C};

    fn num_cache(values: &[&str]) -> String {
        let pts: String = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!(r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, v))
            .collect();
        format!("<c:numRef><c:numCache>{}</c:numCache></c:numRef>", pts)
    }

    fn chart_xml(plot: &str, title: &str, series: &[(&str, &[&str])]) -> String {
        let sers: String = series
            .iter()
            .map(|(name, values)| {
                let tx = if name.is_empty() {
                    String::new()
                } else {
                    format!(
                        "<c:tx><c:strRef><c:strCache><c:pt idx=\"0\"><c:v>{}</c:v></c:pt></c:strCache></c:strRef></c:tx>",
                        name
                    )
                };
                format!("<c:ser>{}<c:val>{}</c:val></c:ser>", tx, num_cache(values))
            })
            .collect();
        format!(
            r#"<c:chartSpace xmlns:c="{NS_C}" xmlns:a="{NS_A}"><c:chart>{title}<c:plotArea><{plot}>{sers}</{plot}></c:plotArea></c:chart></c:chartSpace>"#
        )
    }

    fn rich_title(text: &str) -> String {
        format!("<c:title><c:tx><c:rich><a:p><a:r><a:t>{}</a:t></a:r></a:p></c:rich></c:tx></c:title>", text)
    }

    #[test]
    fn test_parse_bar_chart() {
        let xml = chart_xml(
            "c:barChart",
            &rich_title("Revenue"),
            &[("2023", &["1", "2", "3"]), ("2024", &["4", "5"])],
        );
        let chart = parse_chart("chart1", 1, "ppt/charts/chart1.xml", &xml)
            .unwrap()
            .unwrap();
        assert_eq!(chart.title, "Revenue");
        assert_eq!(chart.chart_type, ChartType::Bar);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "2023");
        assert_eq!(chart.data_points_count(), 3);
        assert_eq!(chart.categories, vec!["Category 1", "Category 2", "Category 3"]);
    }

    #[test]
    fn test_malformed_values_become_zero() {
        let xml = chart_xml("c:lineChart", "", &[("S", &["1.5", "n/a", ""])]);
        let chart = parse_chart("chart1", 1, "c.xml", &xml).unwrap().unwrap();
        assert_eq!(chart.series[0].values, vec![1.5, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_series_dropped_and_default_names() {
        let xml = chart_xml("c:pieChart", "", &[("", &[]), ("", &["7"])]);
        let chart = parse_chart("chart2", 2, "c.xml", &xml).unwrap().unwrap();
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, "Series 2");
        assert_eq!(chart.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_axis_title_is_not_chart_title() {
        let axis = "<c:valAx><c:title><c:tx><c:rich><a:p><a:r><a:t>USD</a:t></a:r></a:p></c:rich></c:tx></c:title></c:valAx>";
        let xml = chart_xml("c:barChart", &rich_title("Revenue"), &[("S", &["1"])])
            .replace("</c:plotArea>", &format!("{}</c:plotArea>", axis));
        let chart = parse_chart("chart1", 1, "c.xml", &xml).unwrap().unwrap();
        assert_eq!(chart.title, "Revenue");

        let untitled = chart_xml("c:barChart", "<c:autoTitleDeleted val=\"1\"/>", &[("S", &["1"])])
            .replace("</c:plotArea>", &format!("{}</c:plotArea>", axis));
        let chart = parse_chart("chart1", 1, "c.xml", &untitled).unwrap().unwrap();
        assert_eq!(chart.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_multi_paragraph_title() {
        let title = "<c:title><c:tx><c:rich><a:p><a:r><a:t>Sales</a:t></a:r><a:r><a:t> 2024</a:t></a:r></a:p><a:p><a:r><a:t>by region</a:t></a:r></a:p></c:rich></c:tx></c:title>";
        let xml = chart_xml("c:barChart", title, &[("S", &["1"])]);
        let chart = parse_chart("chart1", 1, "c.xml", &xml).unwrap().unwrap();
        assert_eq!(chart.title, "Sales 2024 by region");
    }

    #[test]
    fn test_sparse_points_placed_by_index() {
        let xml = format!(
            r#"<c:chartSpace xmlns:c="{NS_C}"><c:chart><c:plotArea><c:barChart><c:ser>
<c:cat><c:strRef><c:strCache><c:ptCount val="3"/><c:pt idx="0"><c:v>Q1</c:v></c:pt><c:pt idx="1"><c:v>Q2</c:v></c:pt><c:pt idx="2"><c:v>Q3</c:v></c:pt></c:strCache></c:strRef></c:cat>
<c:val><c:numRef><c:numCache><c:ptCount val="3"/><c:pt idx="0"><c:v>10</c:v></c:pt><c:pt idx="2"><c:v>30</c:v></c:pt></c:numCache></c:numRef></c:val>
</c:ser></c:barChart></c:plotArea></c:chart></c:chartSpace>"#
        );
        let chart = parse_chart("chart1", 1, "c.xml", &xml).unwrap().unwrap();
        assert_eq!(chart.series[0].values, vec![10.0, 0.0, 30.0]);
        assert_eq!(chart.categories, vec!["Q1", "Q2", "Q3"]);
        assert_eq!(chart.category_label(2), "Q3");
        assert_eq!(chart.cell(0, 2), "30");
    }

    #[test]
    fn test_point_count_pads_trailing_gaps() {
        let xml = format!(
            r#"<c:chartSpace xmlns:c="{NS_C}"><c:chart><c:plotArea><c:lineChart><c:ser>
<c:cat><c:strLit><c:ptCount val="4"/><c:pt idx="1"><c:v>Feb</c:v></c:pt></c:strLit></c:cat>
<c:val><c:numLit><c:ptCount val="4"/><c:pt idx="1"><c:v>5</c:v></c:pt></c:numLit></c:val>
</c:ser></c:lineChart></c:plotArea></c:chart></c:chartSpace>"#
        );
        let chart = parse_chart("chart1", 1, "c.xml", &xml).unwrap().unwrap();
        assert_eq!(chart.series[0].values, vec![0.0, 5.0, 0.0, 0.0]);
        assert_eq!(chart.categories, vec!["", "Feb", "", ""]);
    }

    #[test]
    fn test_multi_level_categories_use_first_level() {
        let xml = format!(
            r#"<c:chartSpace xmlns:c="{NS_C}"><c:chart><c:plotArea><c:barChart><c:ser>
<c:cat><c:multiLvlStrRef><c:multiLvlStrCache><c:ptCount val="2"/>
<c:lvl><c:pt idx="0"><c:v>Jan</c:v></c:pt><c:pt idx="1"><c:v>Feb</c:v></c:pt></c:lvl>
<c:lvl><c:pt idx="0"><c:v>2024</c:v></c:pt></c:lvl>
</c:multiLvlStrCache></c:multiLvlStrRef></c:cat>
<c:val><c:numLit><c:pt idx="0"><c:v>1</c:v></c:pt><c:pt idx="1"><c:v>2</c:v></c:pt></c:numLit></c:val>
</c:ser></c:barChart></c:plotArea></c:chart></c:chartSpace>"#
        );
        let chart = parse_chart("chart1", 1, "c.xml", &xml).unwrap().unwrap();
        assert_eq!(chart.categories, vec!["Jan", "Feb"]);
    }

    #[test]
    fn test_no_series_yields_no_chart() {
        let xml = chart_xml("c:barChart", &rich_title("Empty"), &[]);
        assert!(parse_chart("chart1", 1, "c.xml", &xml).unwrap().is_none());
    }

    #[test]
    fn test_unknown_type() {
        let xml = chart_xml("c:stockChart", "", &[("S", &["1"])]);
        let chart = parse_chart("chart1", 1, "c.xml", &xml).unwrap().unwrap();
        assert_eq!(chart.chart_type, ChartType::Unknown);
    }

    #[test]
    fn test_first_type_in_order_wins() {
        let xml = format!(
            r#"<c:chartSpace xmlns:c="{NS_C}"><c:plotArea><c:lineChart/><c:barChart><c:ser><c:val><c:numLit><c:pt idx="0"><c:v>3</c:v></c:pt></c:numLit></c:val></c:ser></c:barChart></c:plotArea></c:chartSpace>"#
        );
        let chart = parse_chart("chart1", 1, "c.xml", &xml).unwrap().unwrap();
        assert_eq!(chart.chart_type, ChartType::Bar);
        assert_eq!(chart.series[0].values, vec![3.0]);
    }

    #[test]
    fn test_explicit_categories_and_unprefixed_markup() {
        let xml = r#"<chartSpace><chart><title><tx><strRef><strCache><pt><v>Plain</v></pt></strCache></strRef></tx></title>
<plotArea><areaChart><ser><tx><v>Units</v></tx>
<cat><strRef><strCache><pt><v> North </v></pt><pt><v>South</v></pt></strCache></strRef></cat>
<val><numRef><numCache><pt><v>10</v></pt><pt><v>20</v></pt></numCache></numRef></val>
</ser></areaChart></plotArea></chart></chartSpace>"#;
        let chart = parse_chart("chart1", 1, "c.xml", xml).unwrap().unwrap();
        assert_eq!(chart.title, "Plain");
        assert_eq!(chart.chart_type, ChartType::Area);
        assert_eq!(chart.series[0].name, "Units");
        assert_eq!(chart.categories, vec!["North", "South"]);
    }

    #[test]
    fn test_malformed_chart_is_error() {
        assert!(parse_chart("chart1", 1, "c.xml", "<c:chartSpace><c:ser>").is_err());
    }

    #[test]
    fn test_extract_all_sorts_and_skips_failures() {
        let good = chart_xml("c:barChart", &rich_title("Ten"), &[("S", &["1"])]);
        let two = chart_xml("c:radarChart", &rich_title("Two"), &[("S", &["1", "2"])]);
        let data = build_zip(&[
            ("ppt/charts/chart10.xml", good.as_bytes()),
            ("ppt/charts/chart3.xml", b"<c:chartSpace><broken"),
            ("ppt/charts/chart2.xml", two.as_bytes()),
        ]);
        let container = PptxContainer::from_bytes(data).unwrap();
        let mut extractor = ChartExtractor::new();
        let ids: Vec<&str> = extractor
            .extract_all(&container)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["chart2", "chart10"]);

        let stats = extractor.stats();
        assert_eq!(stats.total_charts, 2);
        assert_eq!(stats.total_series, 2);
        assert_eq!(stats.total_data_points, 3);
        assert_eq!(stats.by_type.get(&ChartType::Radar), Some(&1));
        assert_eq!(stats.average_series_per_chart, 1.0);

        assert!(extractor.chart_by_id("chart10").is_some());
        let json = extractor.chart_json("chart2").unwrap().unwrap();
        assert!(json.contains("\"type\": \"radar\""));
        assert!(extractor.chart_json("chart99").unwrap().is_none());
    }
}
