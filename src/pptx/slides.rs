//! Slide markup: text blocks, tables and part relationships.

use crate::container::PptxContainer;
use crate::model::{SlideTable, TextBlock, TextKind};
use crate::render::cleanup::normalize_text;
use crate::xml::{self, Element, XmlTree};
use std::collections::HashMap;

/// Placeholder types that mark a shape as the slide title.
const TITLE_PLACEHOLDERS: &[&str] = &["title", "ctrTitle"];

/// Deepest outline level (`a:pPr@lvl` ranges over 0..=8).
const MAX_LEVEL: u32 = 8;

/// Relationships part of a package part.
///
/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
pub fn relationships_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Relationship id to target for a part; empty when the part has none.
pub fn read_relationships(container: &PptxContainer, part: &str) -> HashMap<String, String> {
    let path = relationships_path(part);
    if !container.exists(&path) {
        return HashMap::new();
    }
    match container.read_xml(&path) {
        Ok(xml) => parse_relationships(&xml),
        Err(e) => {
            log::warn!("{}: {}", path, e);
            HashMap::new()
        }
    }
}

/// Parse a relationships document.
pub fn parse_relationships(xml: &str) -> HashMap<String, String> {
    let tree = XmlTree::parse(xml);
    xml::find_by_tag(tree.document(), "Relationship")
        .into_iter()
        .filter_map(|rel| {
            let id = rel.attr("Id")?;
            let target = rel.attr("Target")?;
            (!id.is_empty() && !target.is_empty()).then(|| (id.to_string(), target.to_string()))
        })
        .collect()
}

/// Text and tables of one slide, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideContent {
    pub blocks: Vec<TextBlock>,
    pub tables: Vec<SlideTable>,
}

/// Read the body content of a parsed slide.
///
/// Every non-empty paragraph of a text shape becomes a block. A shape using
/// a title placeholder yields a single title block; without one, the first
/// block is promoted to the title.
pub fn parse_slide_content(root: &Element) -> SlideContent {
    let mut blocks = Vec::new();

    for shape in xml::find_by_tag(root, "p:sp") {
        let paragraphs: Vec<(String, u32)> = xml::find_by_tag(shape, "a:p")
            .into_iter()
            .map(|p| (paragraph_text(p), paragraph_level(p)))
            .filter(|(text, _)| !text.is_empty())
            .collect();
        if paragraphs.is_empty() {
            continue;
        }

        if is_title_shape(shape) {
            let text: Vec<String> = paragraphs.into_iter().map(|(text, _)| text).collect();
            blocks.push(TextBlock::title(text.join(" ")));
        } else {
            blocks.extend(
                paragraphs
                    .into_iter()
                    .map(|(text, level)| TextBlock::body(text).with_level(level)),
            );
        }
    }

    if !blocks.iter().any(|b| b.kind == TextKind::Title) {
        if let Some(first) = blocks.first_mut() {
            first.kind = TextKind::Title;
        }
    }

    let tables = xml::find_by_tag(root, "a:tbl")
        .into_iter()
        .map(parse_table)
        .filter(|table| !table.is_empty())
        .collect();

    SlideContent { blocks, tables }
}

fn is_title_shape(shape: &Element) -> bool {
    xml::find_first(shape, "p:nvSpPr p:nvPr p:ph")
        .and_then(|ph| ph.attr("type"))
        .is_some_and(|t| TITLE_PLACEHOLDERS.contains(&t))
}

/// Normalized text of one paragraph; line breaks become spaces.
pub fn paragraph_text(paragraph: &Element) -> String {
    let mut text = String::new();
    collect_runs(paragraph, &mut text);
    normalize_text(text.trim())
}

/// Outline level of a paragraph, clamped to the nine levels PowerPoint offers.
fn paragraph_level(paragraph: &Element) -> u32 {
    xml::children_by_tag(paragraph, "a:pPr")
        .first()
        .and_then(|ppr| ppr.attr("lvl"))
        .and_then(|lvl| lvl.trim().parse::<u32>().ok())
        .map_or(0, |lvl| lvl.min(MAX_LEVEL))
}

fn collect_runs(element: &Element, out: &mut String) {
    for child in element.children() {
        match child.local_name() {
            "t" => out.push_str(&child.text()),
            "br" => out.push(' '),
            _ => collect_runs(child, out),
        }
    }
}

fn parse_table(table: &Element) -> SlideTable {
    let rows = xml::children_by_tag(table, "a:tr")
        .into_iter()
        .map(|row| {
            xml::children_by_tag(row, "a:tc")
                .into_iter()
                .map(|cell| {
                    xml::find_by_tag(cell, "a:p")
                        .into_iter()
                        .map(paragraph_text)
                        .filter(|text| !text.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();
    SlideTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{slide_xml, text_shape};

    fn content(shapes: &str) -> SlideContent {
        let tree = XmlTree::parse(&slide_xml(shapes));
        assert!(!tree.is_malformed());
        parse_slide_content(tree.document())
    }

    #[test]
    fn test_relationships_path() {
        assert_eq!(
            relationships_path("ppt/slides/slide1.xml"),
            "ppt/slides/_rels/slide1.xml.rels"
        );
        assert_eq!(relationships_path("slide1.xml"), "_rels/slide1.xml.rels");
    }

    #[test]
    fn test_parse_relationships() {
        let rels = parse_relationships(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
<Relationship Id="rId3" Target=""/>
</Relationships>"#,
        );
        assert_eq!(rels.len(), 1);
        assert_eq!(rels.get("rId2").map(String::as_str), Some("../media/image1.png"));
    }

    #[test]
    fn test_title_placeholder_wins() {
        let c = content(&format!(
            "{}{}",
            text_shape("Body", Some("body"), &["First point", "Second point"]),
            text_shape("Title", Some("title"), &["Agenda"])
        ));
        assert_eq!(
            c.blocks,
            vec![
                TextBlock::body("First point"),
                TextBlock::body("Second point"),
                TextBlock::title("Agenda"),
            ]
        );
    }

    #[test]
    fn test_first_block_promoted_without_placeholder() {
        let c = content(&text_shape("Text 1", None, &["Welcome", "", "More"]));
        assert_eq!(c.blocks, vec![TextBlock::title("Welcome"), TextBlock::body("More")]);
    }

    #[test]
    fn test_paragraph_levels() {
        let c = content(
            r#"<p:sp><p:txBody><a:p><a:r><a:t>Heading</a:t></a:r></a:p>
<a:p><a:pPr lvl="1"/><a:r><a:t>Child</a:t></a:r></a:p>
<a:p><a:pPr lvl="2" marL="685800"/><a:r><a:t>Grandchild</a:t></a:r></a:p>
<a:p><a:pPr lvl="12"/><a:r><a:t>Too deep</a:t></a:r></a:p>
<a:p><a:pPr lvl="x"/><a:r><a:t>Odd</a:t></a:r></a:p></p:txBody></p:sp>"#,
        );
        assert_eq!(
            c.blocks,
            vec![
                TextBlock::title("Heading"),
                TextBlock::body("Child").with_level(1),
                TextBlock::body("Grandchild").with_level(2),
                TextBlock::body("Too deep").with_level(8),
                TextBlock::body("Odd"),
            ]
        );
    }

    #[test]
    fn test_runs_and_breaks() {
        let c = content(
            r#"<p:sp><p:txBody><a:p><a:r><a:t>Hello </a:t></a:r><a:r><a:t>world</a:t></a:r><a:br/><a:r><a:t>again</a:t></a:r></a:p></p:txBody></p:sp>"#,
        );
        assert_eq!(c.blocks[0].text, "Hello world again");
    }

    #[test]
    fn test_empty_slide() {
        let c = content("");
        assert!(c.blocks.is_empty());
        assert!(c.tables.is_empty());
    }

    #[test]
    fn test_table() {
        let cell = |t: &str| format!("<a:tc><a:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></a:txBody></a:tc>", t);
        let c = content(&format!(
            r#"<p:graphicFrame><a:graphic><a:graphicData><a:tbl><a:tblGrid/><a:tr>{}{}</a:tr><a:tr>{}<a:tc><a:txBody><a:p/></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
            cell("Name"),
            cell("Score"),
            cell("Ada")
        ));
        assert!(c.blocks.is_empty());
        assert_eq!(c.tables.len(), 1);
        assert_eq!(
            c.tables[0].rows,
            vec![
                vec!["Name".to_string(), "Score".to_string()],
                vec!["Ada".to_string(), String::new()],
            ]
        );
    }
}
