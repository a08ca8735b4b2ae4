use super::aggregate::{average_similarity, color_only, fuse};
use super::report::{AnalysisReport, ColorAnalysis};
use crate::config::{Config, LimitsConfig};
use crate::error::{AnalysisError, PaletteError};
use crate::media::{ArtifactStore, PreparedImage, Upload, prepare};
use crate::palette::builder::round_to;
use crate::palette::{COMPARED_COLORS, Palette, PaletteOptions, extract_palette};
use crate::vision::{
    FallbackOutcome, GeminiProvider, ModelFailure, ModelFallback, VisionImage, VisionProvider,
    consistency_prompt, parse_assessment,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// What a request produced. A count violation is not an error: the caller
/// answers it with a normal response carrying `error`.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Rejected { error: String },
    Report(Box<AnalysisReport>),
}

/// The per-request pipeline: preprocess, palette, vision, fusion.
///
/// Immutable after construction and shared across requests behind an `Arc`.
pub struct AnalysisService {
    provider: Arc<dyn VisionProvider>,
    fallback: ModelFallback,
    temperature: f64,
    palette: PaletteOptions,
    max_dimension: u32,
    limits: LimitsConfig,
    artifacts: Option<ArtifactStore>,
}

type WorkerOutput = (PreparedImage, Option<Result<Palette, PaletteError>>);

impl AnalysisService {
    pub fn new(config: &Config, provider: Arc<dyn VisionProvider>) -> Self {
        Self {
            provider,
            fallback: ModelFallback::new(config.vision.models.iter().cloned())
                .with_deadline(Duration::from_secs(config.vision.total_timeout_secs)),
            temperature: config.vision.temperature,
            palette: config.palette.options(),
            max_dimension: config.palette.max_dimension,
            limits: config.limits.clone(),
            artifacts: config
                .uploads
                .persist
                .then(|| ArtifactStore::new(config.upload_dir())),
        }
    }

    /// Build with the Gemini provider described by `config.vision`.
    pub fn from_config(config: &Config) -> Self {
        let provider: Arc<dyn VisionProvider> =
            Arc::new(GeminiProvider::from_config(&config.vision));
        Self::new(config, provider)
    }

    #[must_use]
    pub fn models(&self) -> &[String] {
        self.fallback.models()
    }

    #[must_use]
    pub fn vision_configured(&self) -> bool {
        self.provider.is_configured()
    }

    #[must_use]
    pub fn count_message(&self) -> String {
        format!(
            "Please upload {}-{} images",
            self.limits.min_images, self.limits.max_images
        )
    }

    pub async fn analyze(&self, uploads: Vec<Upload>) -> Result<AnalysisOutcome, AnalysisError> {
        let count = uploads.len();
        if count < self.limits.min_images || count > self.limits.max_images {
            tracing::info!(count, "Rejected upload count");
            return Ok(AnalysisOutcome::Rejected {
                error: self.count_message(),
            });
        }

        let request_id = Uuid::new_v4();
        tracing::info!(%request_id, count, "Analyzing images");

        let processed = self.process_images(uploads).await?;
        let (prepared, palette_results): (Vec<_>, Vec<_>) = processed.into_iter().unzip();

        if let Some(store) = &self.artifacts {
            let stored = store.persist_all(request_id, &prepared).await;
            tracing::debug!(
                %request_id,
                saved = stored.len(),
                dir = %store.request_dir(request_id).display(),
                "Stored upload artifacts"
            );
        }

        let mut palettes = Vec::with_capacity(count);
        let mut skipped_images = Vec::new();
        for (i, result) in palette_results.into_iter().enumerate() {
            let index = i + 1;
            match result {
                Some(Ok(palette)) => palettes.push(palette),
                Some(Err(source)) => {
                    tracing::error!(image = index, "Palette extraction failed: {source}");
                    return Err(AnalysisError::Image { index, source });
                }
                None => skipped_images.push(index),
            }
        }

        let avg_similarity = average_similarity(&palettes);
        let vision_images: Vec<VisionImage> = prepared
            .into_iter()
            .map(|image| VisionImage::new(image.mime_type, image.bytes))
            .collect();

        let (result, model) = match self.ask_model(&vision_images).await {
            FallbackOutcome::Answered { model, text, .. } => {
                tracing::info!(model = model.as_str(), "Vision model answered");
                (fuse(parse_assessment(&text), avg_similarity), Some(model))
            }
            outcome @ FallbackOutcome::Exhausted { .. } => {
                let failure = outcome.last_error().unwrap_or("unknown error");
                tracing::warn!("All vision models failed, using color analysis only: {failure}");
                (color_only(avg_similarity, failure), None)
            }
        };

        let dominant_colors = palettes
            .first()
            .map(|p| p.top(COMPARED_COLORS).to_vec())
            .unwrap_or_default();
        let color_analysis = ColorAnalysis {
            palettes,
            dominant_colors,
            color_similarity: round_to(avg_similarity, 2),
            skipped_images,
        };

        Ok(AnalysisOutcome::Report(Box::new(AnalysisReport::new(
            result,
            count,
            color_analysis,
            model,
        ))))
    }

    /// Decode, normalize and extract a palette for every upload on the
    /// blocking pool. Results come back in upload order.
    async fn process_images(&self, uploads: Vec<Upload>) -> Result<Vec<WorkerOutput>, AnalysisError> {
        let handles = uploads.into_iter().enumerate().map(|(index, upload)| {
            let options = self.palette.clone();
            let max_dimension = self.max_dimension;
            tokio::task::spawn_blocking(move || {
                let prepared = prepare(index, &upload, max_dimension);
                let palette = prepared
                    .pixels
                    .as_ref()
                    .map(|pixels| extract_palette(pixels, &options));
                (prepared, palette)
            })
        });

        futures_util::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.map_err(|e| AnalysisError::Worker(e.to_string())))
            .collect()
    }

    async fn ask_model(&self, images: &[VisionImage]) -> FallbackOutcome {
        match consistency_prompt(images.len()) {
            Ok(prompt) => {
                self.fallback
                    .run(self.provider.as_ref(), &prompt, images, self.temperature)
                    .await
            }
            Err(e) => FallbackOutcome::Exhausted {
                failures: vec![ModelFailure {
                    model: String::new(),
                    message: e.to_string(),
                }],
            },
        }
    }
}
