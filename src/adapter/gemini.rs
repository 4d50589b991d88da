//! Gemini (Google) `generateContent` backend.

use crate::adapter::backend::GenerationBackend;
use crate::adapter::wire::{GenerateContentRequest, GenerateContentResponse};
use crate::config::StudioConfig;
use crate::error::{sanitize_error_message, Result, StudioError};
use async_trait::async_trait;
use std::time::Instant;

/// HTTP backend for the Gemini API.
pub struct GeminiBackend {
    client: reqwest::Client,
    config: StudioConfig,
}

impl GeminiBackend {
    /// Creates a backend from resolved configuration.
    pub fn new(config: StudioConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Creates a backend configured entirely from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(StudioConfig::from_env()?))
    }

    /// Returns the configured model identifier.
    pub fn model(&self) -> &str {
        self.config.model.as_str()
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.config.base_url, self.model())
    }

    fn parse_error(&self, status: u16, text: &str) -> StudioError {
        let text = sanitize_error_message(text);
        match status {
            401 | 403 => StudioError::Auth(text),
            404 => StudioError::Api {
                status,
                message: format!("model {} not found", self.model()),
            },
            _ => StudioError::Api {
                status,
                message: text,
            },
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let start = Instant::now();
        let url = format!("{}:generateContent", self.model_url());

        tracing::debug!(model = %self.model(), "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text));
        }

        let body: GenerateContentResponse = response.json().await?;

        tracing::debug!(
            model = %self.model(),
            candidates = body.candidates.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "generateContent complete"
        );

        Ok(body)
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(StudioError::Auth("Invalid API key".into())),
            s if !(200..300).contains(&s) => {
                let text = response.text().await.unwrap_or_default();
                Err(self.parse_error(s, &text))
            }
            _ => Ok(()),
        }
    }
}
