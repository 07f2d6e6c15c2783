//! Builders for in-memory decks used by unit tests.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_C: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Zip the given entries into a package.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

/// Wrap shape-tree content in a slide document.
pub fn slide_xml(shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree>{shapes}</p:spTree></p:cSld></p:sld>"#
    )
}

/// A text shape with one paragraph per entry.
pub fn text_shape(name: &str, placeholder: Option<&str>, paragraphs: &[&str]) -> String {
    let ph = placeholder
        .map(|t| format!(r#"<p:nvPr><p:ph type="{}"/></p:nvPr>"#, t))
        .unwrap_or_else(|| "<p:nvPr/>".to_string());
    let paras: String = paragraphs
        .iter()
        .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="{name}"/><p:cNvSpPr/>{ph}</p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/>{paras}</p:txBody></p:sp>"#
    )
}

/// A picture shape.
pub fn picture(name: &str, descr: &str, embed: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="{name}" descr="{descr}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{embed}"/></p:blipFill><p:spPr/></p:pic>"#
    )
}

/// A notes page whose body holds the given runs.
pub fn notes_xml(runs: &[&str]) -> String {
    let paras: String = runs
        .iter()
        .map(|r| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", r))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<p:notes xmlns:a="{NS_A}" xmlns:p="{NS_P}"><p:cSld><p:spTree><p:sp><p:txBody>{paras}</p:txBody></p:sp></p:spTree></p:cSld></p:notes>"#
    )
}
