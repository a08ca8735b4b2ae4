use super::builder::build;
use super::quantize::{QuantizeOptions, quantize};
use super::types::{Palette, Pixel};
use crate::error::PaletteError;
use image::RgbImage;
use image::imageops::{self, FilterType};

pub const DEFAULT_COLORS: usize = 5;
pub const DEFAULT_RESIZE: (u32, u32) = (100, 100);

/// Everything needed to go from a decoded image to a palette.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteOptions {
    pub n_colors: usize,
    /// Every image is resized to exactly this size before clustering, so the
    /// pixel count does not depend on the source resolution.
    pub resize: (u32, u32),
    pub quantize: QuantizeOptions,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            n_colors: DEFAULT_COLORS,
            resize: DEFAULT_RESIZE,
            quantize: QuantizeOptions::default(),
        }
    }
}

/// Resize, flatten, quantize and rank.
pub fn extract_palette(image: &RgbImage, options: &PaletteOptions) -> Result<Palette, PaletteError> {
    let pixels = sample_pixels(image, options.resize)?;
    let quantization = quantize(&pixels, options.n_colors, &options.quantize)?;
    Ok(build(
        &quantization.centers,
        &quantization.labels,
        options.n_colors,
    ))
}

/// Row-major pixels of `image` resized to `width x height`.
pub fn sample_pixels(image: &RgbImage, (width, height): (u32, u32)) -> Result<Vec<Pixel>, PaletteError> {
    if width == 0 || height == 0 {
        return Err(PaletteError::InvalidResize { width, height });
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(PaletteError::EmptyImage);
    }

    let resized = if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::CatmullRom)
    };

    Ok(resized.pixels().map(|pixel| pixel.0).collect())
}
