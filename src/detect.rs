//! Format detection for Office Open XML packages.
//!
//! Only presentations are converted, but Word and Excel packages are still
//! recognized so callers get a precise [`Error::UnsupportedFormat`] instead
//! of a confusing "no slides" failure.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Content type for DOCX main document part.
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Content type for XLSX workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Main-part content types of presentations, slide shows and templates.
const PRESENTATION_CONTENT_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml",
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml",
    "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml",
    "application/vnd.ms-powerpoint.slideshow.macroEnabled.main+xml",
];

/// Detected Office package format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Microsoft Word document (.docx)
    Docx,
    /// Microsoft Excel workbook (.xlsx)
    Xlsx,
    /// Microsoft PowerPoint presentation (.pptx, .pptm, .ppsx, .potx)
    Pptx,
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Docx => "docx",
            FormatType::Xlsx => "xlsx",
            FormatType::Pptx => "pptx",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Docx => "Word Document",
            FormatType::Xlsx => "Excel Workbook",
            FormatType::Pptx => "PowerPoint Presentation",
        }
    }

    pub fn is_presentation(&self) -> bool {
        matches!(self, FormatType::Pptx)
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the format type from a file path.
///
/// # Example
///
/// ```no_run
/// use unslide::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("deck.pptx")?;
/// println!("Detected format: {}", format);
/// # Ok::<(), unslide::Error>(())
/// ```
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    detect_format_from_reader(reader)
}

/// Detect the format type from a byte slice.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }
    detect_format_from_reader(std::io::Cursor::new(data))
}

/// Detect the format type from a reader.
///
/// `[Content_Types].xml` decides; without a known main part the top-level
/// folders are inspected instead.
pub fn detect_format_from_reader<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Some(decode_xml_bytes(&bytes)?)
        }
        Err(_) => None,
    };

    match content_types.as_deref() {
        Some(ct) if PRESENTATION_CONTENT_TYPES.iter().any(|t| ct.contains(t)) => {
            Ok(FormatType::Pptx)
        }
        Some(ct) if ct.contains(DOCX_CONTENT_TYPE) => Ok(FormatType::Docx),
        Some(ct) if ct.contains(XLSX_CONTENT_TYPE) => Ok(FormatType::Xlsx),
        _ => detect_by_folder_structure(&archive),
    }
}

/// Fallback detection by checking folder structure.
fn detect_by_folder_structure<R: Read + Seek>(archive: &zip::ZipArchive<R>) -> Result<FormatType> {
    let has = |prefix: &str| archive.file_names().any(|n| n.starts_with(prefix));

    match (has("word/"), has("xl/"), has("ppt/")) {
        (_, _, true) => Ok(FormatType::Pptx),
        (true, false, false) => Ok(FormatType::Docx),
        (false, true, false) => Ok(FormatType::Xlsx),
        _ => Err(Error::UnknownFormat),
    }
}

/// Fail unless the bytes are a presentation package.
pub fn ensure_presentation(data: &[u8]) -> Result<()> {
    match detect_format_from_bytes(data)? {
        FormatType::Pptx => Ok(()),
        other => Err(Error::UnsupportedFormat(format!(
            "{} (.{}) is not a presentation",
            other,
            other.extension()
        ))),
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::build_zip;

    fn content_types(main: &str) -> String {
        format!(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/main.xml" ContentType="{}"/></Types>"#,
            main
        )
    }

    #[test]
    fn test_format_type_display() {
        assert_eq!(FormatType::Pptx.to_string(), "PowerPoint Presentation");
        assert_eq!(FormatType::Docx.extension(), "docx");
        assert!(FormatType::Pptx.is_presentation());
        assert!(!FormatType::Xlsx.is_presentation());
    }

    #[test]
    fn test_is_zip_file() {
        assert!(is_zip_file(&[0x50, 0x4B, 0x03, 0x04, 0x00]));
        assert!(!is_zip_file(&[0x00, 0x00, 0x00, 0x00]));
        assert!(!is_zip_file(&[0x50, 0x4B])); // Too short
    }

    #[test]
    fn test_detect_invalid_data() {
        let result = detect_format_from_bytes(&[0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_by_content_type() {
        let ct = content_types(PRESENTATION_CONTENT_TYPES[3]);
        let data = build_zip(&[("[Content_Types].xml", ct.as_bytes())]);
        assert_eq!(detect_format_from_bytes(&data).unwrap(), FormatType::Pptx);

        let ct = content_types(DOCX_CONTENT_TYPE);
        let data = build_zip(&[("[Content_Types].xml", ct.as_bytes())]);
        assert_eq!(detect_format_from_bytes(&data).unwrap(), FormatType::Docx);
        assert!(matches!(
            ensure_presentation(&data),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_detect_by_folders() {
        let data = build_zip(&[("ppt/slides/slide1.xml", b"<p:sld/>")]);
        assert_eq!(detect_format_from_bytes(&data).unwrap(), FormatType::Pptx);
        assert!(ensure_presentation(&data).is_ok());

        let data = build_zip(&[("readme.txt", b"hello")]);
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }
}
