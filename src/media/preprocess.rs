//! Upload normalization: decode, force RGB8, cap the longest side, re-encode
//! as PNG. Uploads the decoder rejects are passed through untouched so the
//! vision model still sees them.

use super::detection::detect_upload_mime;
use super::types::{PreparedImage, Upload};
use crate::error::MediaError;
use crate::palette::{Palette, PaletteOptions, extract_palette};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

pub const DEFAULT_MAX_DIMENSION: u32 = 2048;

const PNG_MIME: &str = "image/png";

pub fn decode_rgb(data: &[u8]) -> Result<RgbImage, MediaError> {
    let decoded =
        image::load_from_memory(data).map_err(|e| MediaError::Decode(e.to_string()))?;
    Ok(decoded.into_rgb8())
}

/// Downscale so that neither side exceeds `max_dimension`, keeping the aspect
/// ratio. Images already within bounds are returned as-is. A zero bound
/// disables the cap.
#[must_use]
pub fn cap_dimension(image: RgbImage, max_dimension: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if max_dimension == 0 || longest <= max_dimension {
        return image;
    }

    let scale = f64::from(max_dimension) / f64::from(longest);
    let target_w = scaled_side(width, scale);
    let target_h = scaled_side(height, scale);
    imageops::resize(&image, target_w, target_h, FilterType::Lanczos3)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_side(side: u32, scale: f64) -> u32 {
    ((f64::from(side) * scale).round() as u32).max(1)
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, MediaError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| MediaError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Normalize one upload. Never fails: decode or encode errors are logged and
/// the raw bytes are kept instead.
#[must_use]
pub fn prepare(index: usize, upload: &Upload, max_dimension: u32) -> PreparedImage {
    let raw_mime = || detect_upload_mime(&upload.data, upload.filename.as_deref());

    let image = match decode_rgb(&upload.data) {
        Ok(image) => cap_dimension(image, max_dimension),
        Err(e) => {
            tracing::warn!(image = index + 1, "Could not decode upload, using raw bytes: {e}");
            return PreparedImage {
                mime_type: raw_mime(),
                bytes: upload.data.clone(),
                pixels: None,
            };
        }
    };

    match encode_png(&image) {
        Ok(bytes) => PreparedImage {
            mime_type: PNG_MIME.into(),
            bytes,
            pixels: Some(image),
        },
        Err(e) => {
            tracing::warn!(image = index + 1, "PNG re-encode failed, using raw bytes: {e}");
            PreparedImage {
                mime_type: raw_mime(),
                bytes: upload.data.clone(),
                pixels: Some(image),
            }
        }
    }
}

/// Palette of an encoded image file, capped the same way uploads are.
pub fn palette_from_bytes(
    data: &[u8],
    max_dimension: u32,
    options: &PaletteOptions,
) -> crate::Result<Palette> {
    let image = cap_dimension(decode_rgb(data)?, max_dimension);
    Ok(extract_palette(&image, options)?)
}
