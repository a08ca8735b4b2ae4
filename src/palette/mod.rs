//! Deterministic palette extraction and comparison.
//!
//! An image is resized to a fixed grid, its pixels are clustered with
//! k-means, and the clusters are ranked into a [`Palette`]. Two palettes are
//! compared by the overlap of their three most dominant hex codes.

pub mod builder;
pub mod compare;
pub mod extract;
pub mod quantize;
pub mod types;

pub use builder::build;
pub use compare::{COMPARED_COLORS, compare};
pub use extract::{DEFAULT_COLORS, DEFAULT_RESIZE, PaletteOptions, extract_palette, sample_pixels};
pub use quantize::{Quantization, QuantizeOptions, quantize};
pub use types::{Palette, PaletteEntry, Pixel, rgb_to_hex};
