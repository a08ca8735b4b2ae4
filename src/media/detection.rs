/// Used for bytes neither the magic-number sniffer nor the filename can place.
pub const FALLBACK_MIME: &str = "application/octet-stream";

#[must_use]
pub fn detect_mime(data: &[u8]) -> Option<String> {
    infer::get(data).map(|info| info.mime_type().to_string())
}

#[must_use]
pub fn detect_mime_from_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg".into()),
        "png" => Some("image/png".into()),
        "gif" => Some("image/gif".into()),
        "webp" => Some("image/webp".into()),
        "bmp" => Some("image/bmp".into()),
        "heic" => Some("image/heic".into()),
        "avif" => Some("image/avif".into()),
        _ => None,
    }
}

/// Magic bytes first, then the filename extension, then [`FALLBACK_MIME`].
#[must_use]
pub fn detect_upload_mime(data: &[u8], filename: Option<&str>) -> String {
    detect_mime(data)
        .or_else(|| filename.and_then(detect_mime_from_extension))
        .unwrap_or_else(|| FALLBACK_MIME.into())
}

#[must_use]
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}
