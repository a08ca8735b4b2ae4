// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod fallback;
pub mod parse;
pub mod prompt;
pub mod scrub;
pub mod traits;

// ── Provider implementations ────────────────────────────────────────────────
pub mod gemini;

pub use fallback::{FallbackOutcome, ModelFailure, ModelFallback};
pub use gemini::GeminiProvider;
pub use parse::{DEFAULT_SCORE, ModelAssessment, parse_assessment};
pub use prompt::{NO_ISSUES_LINE, consistency_prompt};
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::{VisionImage, VisionProvider};
