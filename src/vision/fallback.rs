use super::traits::{VisionImage, VisionProvider};
use crate::error::VisionError;
use std::time::Duration;

/// One failed model attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFailure {
    pub model: String,
    pub message: String,
}

/// Result of walking the model list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackOutcome {
    /// A model answered; earlier models that failed are kept for logging.
    Answered {
        model: String,
        text: String,
        failures: Vec<ModelFailure>,
    },
    /// Every model failed (or none were configured).
    Exhausted { failures: Vec<ModelFailure> },
}

impl FallbackOutcome {
    /// The error of the last attempt, if the chain was exhausted.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match self {
            Self::Answered { .. } => None,
            Self::Exhausted { failures } => failures.last().map(|f| f.message.as_str()),
        }
    }
}

/// Ordered model identifiers, tried one attempt each, no backoff.
///
/// An optional deadline bounds the whole walk; once it passes, the model in
/// flight is abandoned and the chain reports exhaustion.
#[derive(Debug, Clone)]
pub struct ModelFallback {
    models: Vec<String>,
    deadline: Option<Duration>,
}

impl ModelFallback {
    pub fn new(models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            models: models
                .into_iter()
                .map(Into::into)
                .map(|m: String| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Ask each model in turn and stop at the first answer.
    pub async fn run(
        &self,
        provider: &dyn VisionProvider,
        prompt: &str,
        images: &[VisionImage],
        temperature: f64,
    ) -> FallbackOutcome {
        let mut failures = Vec::new();

        if self.models.is_empty() {
            failures.push(ModelFailure {
                model: String::new(),
                message: VisionError::NoModels.to_string(),
            });
            return FallbackOutcome::Exhausted { failures };
        }

        let expires_at = self.deadline.map(|d| tokio::time::Instant::now() + d);

        for model in &self.models {
            let attempt = provider.analyze_images(prompt, images, model, temperature);
            let result = match expires_at {
                Some(at) => match tokio::time::timeout_at(at, attempt).await {
                    Ok(result) => result,
                    Err(_) => {
                        let secs = self.deadline.map_or(0, |d| d.as_secs());
                        let err = VisionError::DeadlineExceeded { secs };
                        tracing::warn!(
                            provider = provider.name(),
                            model = model.as_str(),
                            "Giving up on vision models: {err}"
                        );
                        failures.push(ModelFailure {
                            model: model.clone(),
                            message: err.to_string(),
                        });
                        return FallbackOutcome::Exhausted { failures };
                    }
                },
                None => attempt.await,
            };

            match result {
                Ok(text) => {
                    if !failures.is_empty() {
                        tracing::info!(
                            provider = provider.name(),
                            model = model.as_str(),
                            failed_before = failures.len(),
                            "Fallback model answered"
                        );
                    }
                    return FallbackOutcome::Answered {
                        model: model.clone(),
                        text,
                        failures,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        model = model.as_str(),
                        "Vision model failed, trying next: {e}"
                    );
                    failures.push(ModelFailure {
                        model: model.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        FallbackOutcome::Exhausted { failures }
    }
}
