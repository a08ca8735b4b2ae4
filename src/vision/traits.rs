use std::future::Future;
use std::pin::Pin;

/// An image handed to a vision model, already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionImage {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl VisionImage {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }
}

/// A multimodal model that answers one text prompt about a set of images.
///
/// Implementations make exactly one attempt per call; choosing another model
/// on failure is the caller's job (see [`super::fallback::ModelFallback`]).
pub trait VisionProvider: Send + Sync {
    /// Provider identifier (e.g. "gemini").
    fn name(&self) -> &str;

    /// Whether credentials are present. A provider without them fails every
    /// call, which callers treat like any other model failure.
    fn is_configured(&self) -> bool {
        true
    }

    fn analyze_images<'a>(
        &'a self,
        prompt: &'a str,
        images: &'a [VisionImage],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}
