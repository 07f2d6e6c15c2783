//! Markdown renderer implementation.

use crate::error::Result;
use crate::model::{Chart, Deck, Image, MatchConfidence, Slide, SlideImage, SlideTable, TextKind};

use super::cleanup::{collapse_blank_lines, escape_table_cell, sanitize_alt_text};
use super::options::ConvertOptions;

/// Marker for a slide without any body content.
pub const NO_CONTENT: &str = "*No content*";

/// Comment appended after an image placed by the first-unclaimed fallback.
pub const LOW_CONFIDENCE_NOTE: &str = "<!-- image placement is a low-confidence guess -->";

/// Spaces per outline level in bullet lists.
const LIST_INDENT: usize = 2;

/// Convert a Deck to Markdown.
pub fn to_markdown(deck: &Deck, options: &ConvertOptions) -> Result<String> {
    let mut output = render_header(deck, options);

    for slide in &deck.slides {
        output.push_str(&render_slide(deck, slide, options));
    }

    if options.include_metadata {
        output.push_str(&render_footer(deck));
    }

    let mut output = collapse_blank_lines(&output).trim_end().to_string();
    output.push('\n');
    Ok(output)
}

fn render_header(deck: &Deck, options: &ConvertOptions) -> String {
    let mut header = format!("# {}\n\n", deck.name);
    if !options.include_metadata {
        return header;
    }

    let meta = &deck.metadata;
    if let Some(ref title) = meta.title {
        header.push_str(&format!("*Title: {}*\n", title));
    }
    if let Some(ref author) = meta.author {
        header.push_str(&format!("*Author: {}*\n", author));
    }
    if let Some(modified) = meta.modified.as_ref().or(meta.created.as_ref()) {
        header.push_str(&format!("*Modified: {}*\n", modified));
    }

    let mut features = Vec::new();
    if options.extract_images {
        features.push("Images");
    }
    if options.extract_charts {
        features.push("Charts");
    }
    if options.include_notes {
        features.push("Speaker Notes");
    }
    if !features.is_empty() {
        header.push_str(&format!("*Features: {}*\n", features.join(", ")));
    }

    header.push_str("\n---\n\n");
    header
}

/// Render one slide section.
pub fn render_slide(deck: &Deck, slide: &Slide, options: &ConvertOptions) -> String {
    let mut md = String::new();

    if options.include_slide_numbers {
        md.push_str(&format!("\n\n<!-- Slide {} -->\n\n", slide.number));
        md.push_str(&format!("## Slide {}\n\n", slide.number));
    } else {
        md.push_str("\n\n");
    }

    md.push_str(&render_body(slide));

    let images: Vec<(&SlideImage, &Image)> = slide
        .images
        .iter()
        .filter_map(|placed| deck.image(&placed.image_id).map(|image| (placed, image)))
        .collect();
    if !images.is_empty() {
        md.push_str("\n\n### Images\n\n");
        for (placed, image) in images {
            md.push_str(&render_image(image, options));
            md.push('\n');
            if options.annotate_low_confidence && placed.confidence == MatchConfidence::Low {
                md.push_str(LOW_CONFIDENCE_NOTE);
                md.push('\n');
            }
            md.push('\n');
        }
    }

    for chart in slide.charts.iter().filter_map(|id| deck.chart(id)) {
        md.push_str(&render_chart(chart));
    }

    if let Some(ref notes) = slide.notes {
        md.push_str(&format!("\n\n### Speaker Notes\n\n{}\n", notes));
    }

    md
}

/// Slide text: the title as a heading, other blocks as bullets, then tables.
fn render_body(slide: &Slide) -> String {
    if slide.failed || !slide.has_content() {
        return format!("{}\n", NO_CONTENT);
    }

    let mut md = String::new();
    if let Some(title) = slide.title() {
        md.push_str(&format!("### {}\n\n", title));
    }
    for block in slide.blocks.iter().filter(|b| b.kind == TextKind::Body) {
        let indent = " ".repeat(block.level as usize * LIST_INDENT);
        md.push_str(&format!("{}- {}\n", indent, block.text));
    }
    for table in slide.tables.iter().filter(|t| !t.is_empty()) {
        md.push('\n');
        md.push_str(&render_table(table));
    }
    md
}

fn render_table(table: &SlideTable) -> String {
    let columns = table.column_count();
    let mut md = String::new();

    for (i, row) in table.rows.iter().enumerate() {
        let cells: Vec<String> = (0..columns)
            .map(|c| row.get(c).map(|t| escape_table_cell(t)).unwrap_or_default())
            .collect();
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
        if i == 0 {
            md.push_str(&format!("| {} |\n", vec!["---"; columns].join(" | ")));
        }
    }
    md
}

/// Image syntax with sanitized alt text.
///
/// The payload is embedded as a `data:` URI unless file references were
/// requested, in which case the prefixed file name is used.
pub fn render_image(image: &Image, options: &ConvertOptions) -> String {
    let alt = if image.alt_text.trim().is_empty() {
        sanitize_alt_text(&image.filename)
    } else {
        sanitize_alt_text(&image.alt_text)
    };
    let target = if options.embed_images {
        image.data_uri()
    } else {
        format!("{}{}", options.image_path_prefix, image.filename)
    };
    format!("![{}]({})", alt, target)
}

/// Chart heading and data table.
///
/// One row per data point up to the longest series; a series without a
/// value at a row leaves its cell empty.
pub fn render_chart(chart: &Chart) -> String {
    let mut md = format!("\n\n### Chart: {}", chart.title);
    if !chart.chart_type.is_unknown() {
        md.push_str(&format!(" ({})", chart.chart_type));
    }
    md.push_str("\n\n");

    let headers: Vec<String> = std::iter::once("Category".to_string())
        .chain(chart.series.iter().map(|s| escape_table_cell(&s.name)))
        .collect();
    md.push_str(&format!("| {} |\n", headers.join(" | ")));
    md.push_str(&format!("| {} |\n", vec!["---"; headers.len()].join(" | ")));

    for row in 0..chart.data_points_count() {
        let cells: Vec<String> = std::iter::once(escape_table_cell(&chart.category_label(row)))
            .chain((0..chart.series.len()).map(|s| chart.cell(s, row)))
            .collect();
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    md
}

fn render_footer(deck: &Deck) -> String {
    let stats = &deck.stats;
    let mut rows = vec![
        ("Total Slides", stats.slide_count.to_string()),
        ("Images", stats.image_count.to_string()),
        ("Charts", stats.chart_count.to_string()),
        ("Speaker Notes", stats.notes_count.to_string()),
        ("Grouped Shapes", stats.group_count.to_string()),
    ];
    if stats.failed_slides > 0 {
        rows.push(("Unreadable Slides", stats.failed_slides.to_string()));
    }
    if stats.low_confidence_matches > 0 {
        rows.push(("Low-Confidence Image Matches", stats.low_confidence_matches.to_string()));
    }
    rows.push(("Processing Time", format!("{}ms", stats.elapsed_ms)));

    let mut md = String::from("\n\n---\n\n## Conversion Statistics\n\n| Metric | Value |\n| --- | --- |\n");
    for (metric, value) in rows {
        md.push_str(&format!("| {} | {} |\n", metric, value));
    }
    md
}
