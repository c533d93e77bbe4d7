use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Declared media type for a file, derived from its extension only
pub fn declared_media_type(path: &Path) -> String {
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let media_type = match ext.as_str() {
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => OCTET_STREAM,
    };
    media_type.to_string()
}

pub fn is_image(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// Pixel dimensions if the bytes decode as a known image format
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// File extension to use when writing bytes of the given media type
pub fn extension_for(media_type: &str) -> &'static str {
    ImageFormat::from_mime_type(media_type)
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("png")
}
