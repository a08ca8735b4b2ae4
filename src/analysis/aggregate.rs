//! Fusion of the model's assessment with local palette similarity.

use super::report::ConsistencyResult;
use crate::palette::{Palette, compare};
use crate::vision::{ModelAssessment, NO_ISSUES_LINE};

/// Below this color similarity (with a model score under
/// [`LOW_SCORE_THRESHOLD`]) a palette-variation issue is added.
pub const LOW_SIMILARITY_THRESHOLD: f64 = 30.0;
pub const LOW_SCORE_THRESHOLD: u8 = 70;
/// At or above this color similarity a consistency note is recommended.
pub const HIGH_SIMILARITY_THRESHOLD: f64 = 60.0;
/// Model scores at or above this replace the issue list with [`NO_ISSUES_LINE`].
pub const EXCELLENT_SCORE_THRESHOLD: u8 = 95;

const NO_ISSUES_MARKER: &str = "None detected";
const EXCELLENT_MARKER: &str = "excellent consistency";

/// Mean of all pairwise [`compare`] scores. Zero with fewer than two palettes.
#[must_use]
pub fn average_similarity(palettes: &[Palette]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0_u32;
    for (i, a) in palettes.iter().enumerate() {
        for b in &palettes[i + 1..] {
            total += compare(a, b);
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        total / f64::from(pairs)
    }
}

/// Combine a model answer with the color average. The model's score is
/// always kept; color only adds notes.
#[must_use]
pub fn fuse(assessment: ModelAssessment, avg_similarity: f64) -> ConsistencyResult {
    let ModelAssessment {
        consistency_score: score,
        key_features,
        mut issues,
        mut recommendations,
    } = assessment;
    let percent = whole_percent(avg_similarity);

    if avg_similarity < LOW_SIMILARITY_THRESHOLD && score < LOW_SCORE_THRESHOLD {
        issues.push(format!(
            "Color palette shows variation ({percent}% similarity) - this may be due to different backgrounds or lighting"
        ));
    } else if avg_similarity >= HIGH_SIMILARITY_THRESHOLD
        && !recommendations
            .join(" ")
            .to_lowercase()
            .contains(EXCELLENT_MARKER)
    {
        recommendations.push(format!(
            "Color palette is consistent ({percent}% similarity)"
        ));
    }

    if score >= EXCELLENT_SCORE_THRESHOLD
        && !issues.iter().any(|issue| issue.contains(NO_ISSUES_MARKER))
    {
        issues = vec![NO_ISSUES_LINE.to_string()];
    }

    ConsistencyResult {
        consistency_score: score,
        key_features,
        issues,
        recommendations,
    }
}

/// Result used when no model answered.
#[must_use]
pub fn color_only(avg_similarity: f64, failure: &str) -> ConsistencyResult {
    ConsistencyResult {
        consistency_score: whole_percent(avg_similarity),
        key_features: vec!["Unable to analyze features - using color analysis only".into()],
        issues: vec![format!("AI analysis unavailable: {failure}")],
        recommendations: vec!["Please try again or check API configuration".into()],
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteEntry;

    fn palette(colors: &[[u8; 3]]) -> Palette {
        let share = 100.0 / colors.len() as f64;
        Palette::from_entries(
            colors
                .iter()
                .map(|&c| PaletteEntry::new(c, share))
                .collect(),
        )
    }

    fn assessment(score: u8, issues: &[&str], recommendations: &[&str]) -> ModelAssessment {
        ModelAssessment {
            consistency_score: score,
            key_features: vec!["Silver hair".into()],
            issues: issues.iter().map(ToString::to_string).collect(),
            recommendations: recommendations.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn average_of_shared_and_disjoint_palettes() {
        let a = palette(&[[1, 1, 1], [2, 2, 2], [3, 3, 3]]);
        let b = a.clone();
        let c = palette(&[[9, 9, 9], [8, 8, 8], [7, 7, 7]]);

        let avg = average_similarity(&[a, b, c]);
        assert!((avg - 33.33).abs() < 0.01, "got {avg}");
    }

    #[test]
    fn average_needs_two_palettes() {
        assert!(average_similarity(&[]).abs() < f64::EPSILON);
        let single = palette(&[[1, 1, 1], [2, 2, 2], [3, 3, 3]]);
        assert!(average_similarity(&[single]).abs() < f64::EPSILON);
    }

    #[test]
    fn model_score_is_never_overridden() {
        let fused = fuse(assessment(40, &[], &[]), 100.0);
        assert_eq!(fused.consistency_score, 40);
    }

    #[test]
    fn low_color_and_low_score_adds_variation_issue() {
        let fused = fuse(assessment(55, &["Hair color differs"], &[]), 12.4);
        assert_eq!(
            fused.issues,
            [
                "Hair color differs",
                "Color palette shows variation (12% similarity) - this may be due to different backgrounds or lighting",
            ]
        );
        assert!(fused.recommendations.is_empty());
    }

    #[test]
    fn low_color_with_decent_score_adds_nothing() {
        let fused = fuse(assessment(80, &["Minor"], &["Tip"]), 10.0);
        assert_eq!(fused.issues, ["Minor"]);
        assert_eq!(fused.recommendations, ["Tip"]);
    }

    #[test]
    fn high_color_adds_consistency_recommendation() {
        let fused = fuse(assessment(80, &[], &["Use a model sheet"]), 66.666);
        assert_eq!(
            fused.recommendations,
            ["Use a model sheet", "Color palette is consistent (67% similarity)"]
        );
    }

    #[test]
    fn existing_excellent_note_suppresses_color_recommendation() {
        let fused = fuse(
            assessment(80, &[], &["Keep up the Excellent Consistency"]),
            90.0,
        );
        assert_eq!(fused.recommendations, ["Keep up the Excellent Consistency"]);
    }

    #[test]
    fn score_92_keeps_model_issues() {
        let fused = fuse(assessment(92, &["Scar missing in image 3"], &[]), 80.0);
        assert_eq!(fused.issues, ["Scar missing in image 3"]);
    }

    #[test]
    fn score_97_replaces_issues() {
        let fused = fuse(assessment(97, &["Slight line weight change"], &[]), 80.0);
        assert_eq!(
            fused.issues,
            ["None detected - character maintains excellent consistency"]
        );
    }

    #[test]
    fn score_97_keeps_existing_none_detected_issue() {
        let fused = fuse(assessment(97, &["None detected", "Extra"], &[]), 80.0);
        assert_eq!(fused.issues, ["None detected", "Extra"]);
    }

    #[test]
    fn color_only_rounds_average_and_reports_failure() {
        let result = color_only(33.333, "503 Service Unavailable");
        assert_eq!(result.consistency_score, 33);
        assert_eq!(
            result.issues,
            ["AI analysis unavailable: 503 Service Unavailable"]
        );
        assert_eq!(
            result.key_features,
            ["Unable to analyze features - using color analysis only"]
        );
        assert_eq!(
            result.recommendations,
            ["Please try again or check API configuration"]
        );
    }

    #[test]
    fn color_only_identical_images_scores_100() {
        assert_eq!(color_only(100.0, "down").consistency_score, 100);
    }
}
