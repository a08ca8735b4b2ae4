use crate::error::VisionError;
use tera::{Context, Tera};

/// Issue line the model is asked to use when it finds nothing wrong. The
/// aggregator looks for its `None detected` prefix.
pub const NO_ISSUES_LINE: &str = "None detected - character maintains excellent consistency";

const CONSISTENCY_TEMPLATE: &str = r#"You are an expert character designer analyzing {{ image_count }} images to determine if they show the same character.

**Your task:** Evaluate how consistent this character is across all images.

**Scoring Guidelines:**
- 95-100: Identical or near-identical (same image, same character, same style, minimal differences)
- 85-94: Highly consistent (clearly same character, minor variations in pose/angle)
- 70-84: Moderately consistent (same character, noticeable style or proportion differences)
- 50-69: Somewhat consistent (could be same character, significant differences)
- 0-49: Inconsistent (likely different characters or major redesigns)

**Analyze these aspects:**
1. **Physical Features**: Hair (style, length, color), eyes (shape, color), face structure, body proportions
2. **Character Identity**: Are these recognizably the same character? Would a viewer identify them as the same person?
3. **Art Style**: Consistent drawing style, line work quality, shading technique
4. **Distinctive Features**: Unique markings, accessories, clothing elements that define this character

**IMPORTANT:**
- If images appear identical or nearly identical, score should be 95-100
- Focus on CHARACTER features, not backgrounds or minor pose changes
- Be specific about what makes the character consistent or inconsistent

Provide your analysis in this EXACT format:

CONSISTENCY_SCORE: [single number from 0-100]

KEY_FEATURES:
- [List 3-5 defining features that SHOULD stay consistent, e.g., "Long silver hair with red streak"]
- [Focus on the most distinctive/recognizable features]

ISSUES:
- [List any inconsistencies found, or write "{{ no_issues_line }}"]
- [Be specific: "Eye color changes from blue to green in image 2"]

RECOMMENDATIONS:
- [Provide 2-3 actionable tips to maintain or improve consistency]
- [Be practical and specific to what you observed]

Focus on character identity and defining features. Ignore backgrounds, poses, and minor artistic variations."#;

/// Render the fixed consistency prompt for `image_count` images.
pub fn consistency_prompt(image_count: usize) -> Result<String, VisionError> {
    let mut context = Context::new();
    context.insert("image_count", &image_count);
    context.insert("no_issues_line", NO_ISSUES_LINE);
    Tera::one_off(CONSISTENCY_TEMPLATE, &context, false)
        .map_err(|e| VisionError::Prompt(e.to_string()))
}
