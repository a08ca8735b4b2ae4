use crate::palette::{Palette, PaletteEntry};
use serde::{Deserialize, Serialize};

/// Score plus the three text lists shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyResult {
    pub consistency_score: u8,
    pub key_features: Vec<String>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisType {
    #[serde(rename = "Gemini AI Vision + Color Analysis")]
    VisionAndColor,
    #[serde(rename = "Color Analysis Only")]
    ColorOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAnalysis {
    /// One palette per decoded image, in upload order.
    pub palettes: Vec<Palette>,
    /// Top three entries of the first palette.
    pub dominant_colors: Vec<PaletteEntry>,
    /// Mean pairwise palette similarity, two decimals.
    pub color_similarity: f64,
    /// One-based indices of uploads that could not be decoded.
    #[serde(default)]
    pub skipped_images: Vec<usize>,
}

/// The JSON document returned for a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub consistency_score: u8,
    pub num_images_analyzed: usize,
    pub key_features: Vec<String>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub color_analysis: ColorAnalysis,
    pub analysis_type: AnalysisType,
    /// Model that answered; `None` when the report is color-only.
    pub model: Option<String>,
}

impl AnalysisReport {
    #[must_use]
    pub fn new(
        result: ConsistencyResult,
        num_images_analyzed: usize,
        color_analysis: ColorAnalysis,
        model: Option<String>,
    ) -> Self {
        let analysis_type = if model.is_some() {
            AnalysisType::VisionAndColor
        } else {
            AnalysisType::ColorOnly
        };
        Self {
            consistency_score: result.consistency_score,
            num_images_analyzed,
            key_features: result.key_features,
            issues: result.issues,
            recommendations: result.recommendations,
            color_analysis,
            analysis_type,
            model,
        }
    }
}
