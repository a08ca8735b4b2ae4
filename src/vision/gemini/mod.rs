//! Google Gemini `generateContent` client for image-plus-prompt requests.
//!
//! The key is resolved by [`crate::config::Config`] (file, then
//! `GEMINI_API_KEY` / `GOOGLE_API_KEY`) and passed in explicitly; this type
//! never reads the environment.

use super::scrub::sanitize_api_error;
use super::traits::{VisionImage, VisionProvider};
use crate::config::VisionConfig;
use crate::error::VisionError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

mod types;
use types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part};

const MAX_OUTPUT_TOKENS: u32 = 2048;

pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: Option<&str>, base_url: &str, timeout_secs: u64) -> Self {
        Self {
            api_key: api_key
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(ToOwned::to_owned),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client(timeout_secs),
        }
    }

    pub fn from_config(config: &VisionConfig) -> Self {
        Self::new(
            config.api_key.as_deref(),
            &config.base_url,
            config.timeout_secs,
        )
    }

    fn api_key(&self) -> Result<&str, VisionError> {
        self.api_key.as_deref().ok_or(VisionError::MissingApiKey)
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    /// Prompt first, then every image in upload order, all in one user turn.
    fn build_request(
        prompt: &str,
        images: &[VisionImage],
        temperature: f64,
    ) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(Part::text(prompt));
        parts.extend(
            images
                .iter()
                .map(|image| Part::inline_data(&image.media_type, STANDARD.encode(&image.data))),
        );

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }

    fn extract_text(result: &GenerateContentResponse) -> anyhow::Result<String> {
        let text = result
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                let mut out = String::new();
                for part in &content.parts {
                    if let Some(t) = &part.text {
                        if !out.is_empty() {
                            out.push('\n');
                        }
                        out.push_str(t);
                    }
                }
                out
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = result
                .candidates
                .as_ref()
                .and_then(|c| c.first())
                .and_then(|candidate| candidate.finish_reason.as_deref())
                .unwrap_or("no candidates");
            anyhow::bail!("No response from Gemini ({reason})");
        }

        Ok(text)
    }

    async fn call_api(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> anyhow::Result<GenerateContentResponse> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.base_url,
            Self::model_name(model)
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Gemini request failed: {}", sanitize_api_error(&e.to_string())))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Gemini API error ({status}): {}",
                sanitize_api_error(&error_text)
            );
        }

        let result: GenerateContentResponse = response.json().await?;
        if let Some(err) = result.error.as_ref() {
            anyhow::bail!("Gemini API error: {}", sanitize_api_error(&err.message));
        }

        if let Some(usage) = result.usage_metadata.as_ref() {
            tracing::debug!(
                model,
                input_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        Ok(result)
    }
}

fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|_| Client::new())
}

impl VisionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn analyze_images<'a>(
        &'a self,
        prompt: &'a str,
        images: &'a [VisionImage],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = Self::build_request(prompt, images, temperature);
            let result = self.call_api(model, &request).await?;
            Self::extract_text(&result)
        })
    }
}
