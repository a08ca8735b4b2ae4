//! Structured reading of the model's free-form answer.
//!
//! The expected shape is a `CONSISTENCY_SCORE:` line followed by
//! `KEY_FEATURES:`, `ISSUES:` and `RECOMMENDATIONS:` sections of bullets.
//! Anything missing falls back to [`DEFAULT_SCORE`] and empty lists.

use serde::{Deserialize, Serialize};

/// Score used when the model's score line is missing or has no digits.
pub const DEFAULT_SCORE: u8 = 75;

const SCORE_HEADER: &str = "CONSISTENCY_SCORE:";
const BULLET_CHARS: &[char] = &['-', '•', '*', ' '];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAssessment {
    pub consistency_score: u8,
    pub key_features: Vec<String>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Default for ModelAssessment {
    fn default() -> Self {
        Self {
            consistency_score: DEFAULT_SCORE,
            key_features: Vec::new(),
            issues: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    KeyFeatures,
    Issues,
    Recommendations,
}

impl Section {
    const HEADERS: [(&'static str, Self); 3] = [
        ("KEY_FEATURES:", Self::KeyFeatures),
        ("ISSUES:", Self::Issues),
        ("RECOMMENDATIONS:", Self::Recommendations),
    ];

    /// A bare header opens its section whatever follows it on the line. A
    /// bold or heading header must stand alone, so bullets that merely
    /// mention a header stay data.
    fn from_line(line: &str) -> Option<Self> {
        if let Some((section, _)) = Self::split(line) {
            return Some(section);
        }
        let (section, rest) = Self::split(strip_emphasis(line)?)?;
        rest.trim_matches(['*', ' ']).is_empty().then_some(section)
    }

    fn split(line: &str) -> Option<(Self, &str)> {
        Self::HEADERS
            .iter()
            .find_map(|(header, section)| line.strip_prefix(*header).map(|rest| (*section, rest)))
    }
}

/// Parse the model's text. Never fails.
#[must_use]
pub fn parse_assessment(text: &str) -> ModelAssessment {
    let mut assessment = ModelAssessment::default();
    let mut current = None;

    for raw in text.lines() {
        let line = raw.trim();
        let score = line
            .strip_prefix(SCORE_HEADER)
            .or_else(|| strip_emphasis(line)?.strip_prefix(SCORE_HEADER));

        if let Some(rest) = score {
            assessment.consistency_score = parse_score(rest).unwrap_or(DEFAULT_SCORE);
            continue;
        }

        if let Some(section) = Section::from_line(line) {
            current = Some(section);
            continue;
        }

        let Some(section) = current else { continue };
        if line.is_empty() {
            continue;
        }

        let item = line.trim_start_matches(BULLET_CHARS).trim();
        // Lines ending in a colon are sub-headers inside a section.
        if item.is_empty() || item.ends_with(':') {
            continue;
        }

        let target = match section {
            Section::KeyFeatures => &mut assessment.key_features,
            Section::Issues => &mut assessment.issues,
            Section::Recommendations => &mut assessment.recommendations,
        };
        target.push(item.to_string());
    }

    assessment
}

/// Text after a leading bold or heading marker, e.g. `**ISSUES:**` or
/// `## KEY_FEATURES:`. A single `*` is a bullet, not emphasis.
fn strip_emphasis(line: &str) -> Option<&str> {
    if line.starts_with('#') {
        Some(line.trim_start_matches(['#', ' ']))
    } else if line.starts_with("**") {
        Some(line.trim_start_matches('*').trim_start())
    } else {
        None
    }
}

/// First run of digits, clamped to 100.
fn parse_score(rest: &str) -> Option<u8> {
    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    let value = digits.parse::<u32>().unwrap_or(u32::MAX);
    u8::try_from(value.min(100)).ok()
}
