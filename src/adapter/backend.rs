//! The seam to the external generation capability.

use crate::adapter::wire::{GenerateContentRequest, GenerateContentResponse};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can answer a `generateContent` request.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Sends one request and returns the raw response. Never retries.
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    /// Returns the name of this backend for display.
    fn name(&self) -> &str;

    /// Checks if the backend is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

#[async_trait]
impl<B: GenerationBackend + ?Sized> GenerationBackend for Arc<B> {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        (**self).generate_content(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn health_check(&self) -> Result<()> {
        (**self).health_check().await
    }
}
