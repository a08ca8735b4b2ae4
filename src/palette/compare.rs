use super::types::Palette;
use std::collections::HashSet;

/// How many leading entries of each palette take part in a comparison.
pub const COMPARED_COLORS: usize = 3;

/// Share of the top-3 hex codes two palettes have in common, in `0..=100`.
///
/// The divisor is always three, even when a palette has fewer distinct
/// leading colors.
#[must_use]
pub fn compare(a: &Palette, b: &Palette) -> f64 {
    let left = top_hexes(a);
    let right = top_hexes(b);
    #[allow(clippy::cast_precision_loss)]
    let matches = left.intersection(&right).count() as f64;
    matches / COMPARED_COLORS as f64 * 100.0
}

fn top_hexes(palette: &Palette) -> HashSet<&str> {
    palette
        .top(COMPARED_COLORS)
        .iter()
        .map(|entry| entry.hex.as_str())
        .collect()
}
