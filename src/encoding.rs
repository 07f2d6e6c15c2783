//! Binary payload helpers: base64 text form, `data:` URIs and MIME types.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode a payload as standard base64.
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard base64 text back to bytes.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text.trim())?)
}

/// Build a self-contained `data:` URI.
pub fn data_uri(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, encode_base64(data))
}

/// Split a base64 `data:` URI into its MIME type and decoded payload.
pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::Encoding("not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Encoding("data URI has no payload".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| Error::Encoding("data URI is not base64 encoded".to_string()))?;
    Ok((mime_type.to_string(), decode_base64(payload)?))
}

/// MIME type inferred from a file name's extension.
pub fn mime_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}

/// Human-readable byte size (`1.5 KB`).
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let rounded = (size * 100.0).round() / 100.0;
    format!("{} {}", crate::model::format_number(rounded), UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_round_trip() {
        let payload: Vec<u8> = (0..=255u8).chain([0x89, 0x50, 0x4E, 0x47]).collect();
        let text = encode_base64(&payload);
        assert_eq!(decode_base64(&text).unwrap(), payload);
    }

    #[test]
    fn test_data_uri_round_trip() {
        let payload = b"\x89PNG\r\n\x1a\n".to_vec();
        let uri = data_uri("image/png", &payload);
        assert!(uri.starts_with("data:image/png;base64,"));
        let (mime, decoded) = parse_data_uri(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_parse_data_uri_rejects_plain_text() {
        assert!(parse_data_uri("image1.png").is_err());
        assert!(parse_data_uri("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for("image1.PNG"), "image/png");
        assert_eq!(mime_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(mime_type_for("diagram.svg"), "image/svg+xml");
        assert_eq!(mime_type_for("scan.tif"), "image/tiff");
        assert_eq!(mime_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1 MB");
    }
}
