use serde::{Deserialize, Serialize};

/// One RGB pixel, channels in `0..=255`.
pub type Pixel = [u8; 3];

/// A representative color with its share of the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub hex: String,
    pub rgb: [u8; 3],
    pub percentage: f64,
}

impl PaletteEntry {
    #[must_use]
    pub fn new(rgb: [u8; 3], percentage: f64) -> Self {
        Self {
            hex: rgb_to_hex(rgb),
            rgb,
            percentage,
        }
    }
}

/// Ranked palette, most dominant color first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<PaletteEntry>);

impl Palette {
    /// Wrap entries as-is. Callers are expected to pass them already ranked.
    #[must_use]
    pub fn from_entries(entries: Vec<PaletteEntry>) -> Self {
        Self(entries)
    }

    #[must_use]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaletteEntry> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first `n` entries (fewer if the palette is shorter).
    #[must_use]
    pub fn top(&self, n: usize) -> &[PaletteEntry] {
        &self.0[..n.min(self.0.len())]
    }

    #[must_use]
    pub fn total_percentage(&self) -> f64 {
        self.0.iter().map(|entry| entry.percentage).sum()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::slice::Iter<'a, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Lowercase `#rrggbb`, each channel zero-padded to two digits.
#[must_use]
pub fn rgb_to_hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}
