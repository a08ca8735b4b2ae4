use super::types::{Palette, PaletteEntry};

/// Turn quantizer output into a ranked palette.
///
/// One entry per cluster index in `0..n_colors`: coverage is the share of
/// `labels` pointing at the cluster (percent, two decimals) and the color is
/// the center rounded to the nearest integer per channel. Entries are sorted
/// by coverage, largest first; the sort is stable, so equal coverages keep
/// ascending cluster order.
#[must_use]
pub fn build(centers: &[[f64; 3]], labels: &[usize], n_colors: usize) -> Palette {
    let mut counts = vec![0usize; n_colors];
    for &label in labels {
        if let Some(count) = counts.get_mut(label) {
            *count += 1;
        }
    }

    let mut entries: Vec<PaletteEntry> = centers
        .iter()
        .zip(counts)
        .take(n_colors)
        .map(|(center, count)| PaletteEntry::new(center_to_rgb(center), coverage(count, labels.len())))
        .collect();

    entries.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    Palette::from_entries(entries)
}

#[allow(clippy::cast_precision_loss)]
fn coverage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(100.0 * count as f64 / total as f64, 2)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn center_to_rgb(center: &[f64; 3]) -> [u8; 3] {
    center.map(|channel| channel.round().clamp(0.0, 255.0) as u8)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
