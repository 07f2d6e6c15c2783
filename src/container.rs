//! ZIP container abstraction for PPTX packages.

use crate::error::{Error, Result};
use crate::model::DeckMetadata;
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Extensions accepted for `media/image<N>.<ext>` entries.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "tiff", "tif",
];

/// Fix the XML encoding declaration after a UTF-16 payload was decoded.
///
/// quick-xml would otherwise try to re-decode the already UTF-8 string.
fn fix_xml_encoding_declaration(content: &str) -> String {
    let Some(end_decl) = content
        .starts_with("<?xml")
        .then(|| content.find("?>"))
        .flatten()
    else {
        return content.to_string();
    };

    let (decl, rest) = content.split_at(end_decl + 2);
    let fixed = decl
        .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
        .replace("encoding='UTF-16'", "encoding='UTF-8'")
        .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
        .replace("encoding='utf-16'", "encoding='UTF-8'");
    format!("{}{}", fixed, rest)
}

/// Decode XML bytes handling UTF-8 (with or without BOM) and UTF-16 LE/BE.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8(rest.to_vec())
            .map_err(|e| Error::Encoding(e.to_string())),
        [0xFF, 0xFE, rest @ ..] => {
            decode_utf16(rest, u16::from_le_bytes).map(|s| fix_xml_encoding_declaration(&s))
        }
        [0xFE, 0xFF, rest @ ..] => {
            decode_utf16(rest, u16::from_be_bytes).map(|s| fix_xml_encoding_declaration(&s))
        }
        _ => match String::from_utf8(bytes.to_vec()) {
            Ok(s) => Ok(s),
            // Without a BOM, ASCII markup in UTF-16 shows up as interleaved NULs.
            Err(_) if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 => {
                decode_utf16(bytes, u16::from_le_bytes)
            }
            Err(_) if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 => {
                decode_utf16(bytes, u16::from_be_bytes)
            }
            Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Extract `N` from an entry path shaped like `.../<dir>/<stem><N>.<ext>`.
///
/// Matching is case-insensitive; `dir` must start at a path boundary so that
/// `notesSlides/notesSlide1.xml` is never mistaken for a slide.
pub fn entry_ordinal(path: &str, dir: &str, stem: &str, extensions: &[&str]) -> Option<u32> {
    let (body, ext) = path.rsplit_once('.')?;
    if !extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
        return None;
    }

    let body = body.to_ascii_lowercase();
    let marker = format!("{}/{}", dir, stem).to_ascii_lowercase();
    let idx = body.rfind(&marker)?;
    if idx > 0 && !body[..idx].ends_with('/') {
        return None;
    }

    let digits = &body[idx + marker.len()..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// PPTX container over an in-memory ZIP archive.
///
/// Entries are decoded lazily on request; the whole package is held in
/// memory for the duration of one conversion.
pub struct PptxContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl PptxContainer {
    /// Open a PPTX container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use unslide::container::PptxContainer;
    ///
    /// let container = PptxContainer::open("deck.pptx")?;
    /// println!("{} slides", container.slide_entries().len());
    /// # Ok::<(), unslide::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create a container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Create a container from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML entry as a string, decoding UTF-8 or UTF-16.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a binary entry.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check if an entry exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == path)
    }

    /// List all entries in the archive.
    pub fn list_files(&self) -> Vec<String> {
        self.archive
            .borrow()
            .file_names()
            .map(String::from)
            .collect()
    }

    /// Entries named `<dir>/<stem><N>.<ext>`, sorted by `N` numerically.
    ///
    /// `chart2` sorts before `chart10`. When two entries share an ordinal the
    /// lexically first path wins.
    pub fn numbered_entries(&self, dir: &str, stem: &str, extensions: &[&str]) -> Vec<(u32, String)> {
        let mut entries: Vec<(u32, String)> = self
            .archive
            .borrow()
            .file_names()
            .filter_map(|name| {
                entry_ordinal(name, dir, stem, extensions).map(|n| (n, name.to_string()))
            })
            .collect();
        entries.sort();
        entries.dedup_by_key(|(n, _)| *n);
        entries
    }

    /// Slide markup entries (`slides/slide<N>.xml`).
    pub fn slide_entries(&self) -> Vec<(u32, String)> {
        self.numbered_entries("slides", "slide", &["xml"])
    }

    /// Chart markup entries (`charts/chart<N>.xml`).
    pub fn chart_entries(&self) -> Vec<(u32, String)> {
        self.numbered_entries("charts", "chart", &["xml"])
    }

    /// Speaker-notes entries (`notesSlides/notesSlide<N>.xml`).
    pub fn notes_entries(&self) -> Vec<(u32, String)> {
        self.numbered_entries("notesSlides", "notesSlide", &["xml"])
    }

    /// Media entries (`media/image<N>.<ext>`).
    pub fn image_entries(&self) -> Vec<(u32, String)> {
        self.numbered_entries("media", "image", IMAGE_EXTENSIONS)
    }

    /// Parse core metadata from docProps/core.xml.
    ///
    /// A missing or unreadable part yields empty metadata.
    pub fn parse_core_metadata(&self) -> DeckMetadata {
        let mut meta = DeckMetadata::default();

        let Ok(xml) = self.read_xml("docProps/core.xml") else {
            return meta;
        };

        let mut reader = quick_xml::Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut current_element: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => {
                    current_element =
                        Some(String::from_utf8_lossy(e.name().local_name().as_ref()).to_string());
                }
                Ok(quick_xml::events::Event::Text(e)) => {
                    if let Some(ref elem) = current_element {
                        let text = e.unescape().unwrap_or_default().to_string();
                        match elem.as_str() {
                            "title" => meta.title = Some(text),
                            "creator" => meta.author = Some(text),
                            "created" => meta.created = Some(text),
                            "modified" => meta.modified = Some(text),
                            _ => {}
                        }
                    }
                }
                Ok(quick_xml::events::Event::End(_)) => current_element = None,
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => {
                    log::warn!("docProps/core.xml is malformed: {}", e);
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        meta
    }
}

impl std::fmt::Debug for PptxContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PptxContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}
