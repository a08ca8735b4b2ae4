use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the character checker.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; provider plumbing and the binary continue
/// to use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum CheckerError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Palette extraction ──────────────────────────────────────────────
    #[error("palette: {0}")]
    Palette(#[from] PaletteError),

    // ── Image preprocessing ─────────────────────────────────────────────
    #[error("media: {0}")]
    Media(#[from] MediaError),

    // ── Vision model ────────────────────────────────────────────────────
    #[error("vision: {0}")]
    Vision(#[from] VisionError),

    // ── Request pipeline ────────────────────────────────────────────────
    #[error("analysis: {0}")]
    Analysis(#[from] AnalysisError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Palette errors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("image has no pixels")]
    EmptyImage,

    #[error("color count must be at least 1")]
    InvalidColorCount,

    #[error("requested {requested} colors but the image only has {distinct} distinct colors")]
    NotEnoughColors { requested: usize, distinct: usize },

    #[error("resize target must be non-zero (got {width}x{height})")]
    InvalidResize { width: u32, height: u32 },
}

// ─── Media errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("failed to persist artifact {path}: {message}")]
    Persist { path: String, message: String },
}

// ─── Vision model errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Gemini API key not configured")]
    MissingApiKey,

    #[error("vision models did not answer within {secs}s")]
    DeadlineExceeded { secs: u64 },

    #[error("no vision models configured")]
    NoModels,

    #[error("prompt render failed: {0}")]
    Prompt(String),
}

// ─── Analysis pipeline errors ────────────────────────────────────────────────

/// Failures that abort a whole analysis request. `index` is one-based.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Image {index} could not be analyzed: {source}")]
    Image {
        index: usize,
        #[source]
        source: PaletteError,
    },

    #[error("image worker failed: {0}")]
    Worker(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, CheckerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_correctly() {
        let err = CheckerError::Config(ConfigError::Validation("n_colors is zero".into()));
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn not_enough_colors_reports_counts() {
        let err = CheckerError::Palette(PaletteError::NotEnoughColors {
            requested: 5,
            distinct: 2,
        });
        let msg = err.to_string();
        assert!(msg.contains("requested 5 colors"));
        assert!(msg.contains("2 distinct"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let checker_err: CheckerError = anyhow_err.into();
        assert!(checker_err.to_string().contains("something went wrong"));
    }

    #[test]
    fn vision_errors_fit_on_one_line() {
        for err in [
            VisionError::MissingApiKey,
            VisionError::NoModels,
            VisionError::DeadlineExceeded { secs: 300 },
        ] {
            assert!(!err.to_string().contains('\n'), "{err}");
        }
        let err = CheckerError::Vision(VisionError::DeadlineExceeded { secs: 300 });
        assert!(err.to_string().contains("within 300s"));
    }

    #[test]
    fn image_failure_message_is_user_facing() {
        let err = AnalysisError::Image {
            index: 2,
            source: PaletteError::NotEnoughColors {
                requested: 5,
                distinct: 1,
            },
        };
        assert!(
            err.to_string()
                .starts_with("Image 2 could not be analyzed: requested 5 colors")
        );
    }
}
