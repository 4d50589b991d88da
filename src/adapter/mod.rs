//! Request adapter: turns an edit or generation intent into one call to the
//! generation backend and pulls the first inline image out of the answer.

mod backend;
mod gemini;
mod style;
pub mod wire;

pub use backend::GenerationBackend;
pub use gemini::GeminiBackend;
pub use style::StyleVariant;

use crate::error::Result;
use crate::image::ImagePayload;
use wire::{GenerateContentRequest, GenerateContentResponse, InlineData};

/// What a successful call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The first inline image of the first candidate.
    Image(ImagePayload),
    /// The call succeeded but no image part came back.
    Absent,
}

impl Outcome {
    /// Returns the image, if any.
    pub fn into_image(self) -> Option<ImagePayload> {
        match self {
            Self::Image(image) => Some(image),
            Self::Absent => None,
        }
    }
}

/// An edit of an uploaded image.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// The uploaded image.
    pub source: ImagePayload,
    /// Free-text edit instruction.
    pub instruction: String,
}

/// A text-to-image blueprint request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Free-text description.
    pub description: String,
    /// Rendering style.
    pub style: StyleVariant,
}

/// Wraps a [`GenerationBackend`] with the two studio operations.
pub struct RequestAdapter<B> {
    backend: B,
}

impl<B: GenerationBackend> RequestAdapter<B> {
    /// Creates an adapter over `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Edits `image` according to `instruction`.
    pub async fn request_edit(&self, image: &ImagePayload, instruction: &str) -> Result<Outcome> {
        let inline = InlineData {
            mime_type: image.mime_type.clone(),
            data: image.to_base64(),
        };
        let request = GenerateContentRequest::image_edit(inline, instruction);
        let response = self.backend.generate_content(&request).await?;
        extract_image(response)
    }

    /// Generates an image from `description` in the given style.
    pub async fn request_generation(
        &self,
        description: &str,
        style: StyleVariant,
    ) -> Result<Outcome> {
        let request = GenerateContentRequest::text_to_image(description, style.instruction());
        let response = self.backend.generate_content(&request).await?;
        extract_image(response)
    }

    /// Runs an [`EditRequest`].
    pub async fn run_edit(&self, request: &EditRequest) -> Result<Outcome> {
        self.request_edit(&request.source, &request.instruction)
            .await
    }

    /// Runs a [`GenerationRequest`].
    pub async fn run_generation(&self, request: &GenerationRequest) -> Result<Outcome> {
        self.request_generation(&request.description, request.style)
            .await
    }
}

/// First candidate, first inline part wins; everything else is ignored.
fn extract_image(response: GenerateContentResponse) -> Result<Outcome> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        tracing::warn!(block_reason = reason, "prompt blocked by the model");
    }

    if let Some(reason) = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .filter(|r| *r != "STOP")
    {
        tracing::warn!(finish_reason = reason, "generation finished abnormally");
    }

    match response.first_inline_image() {
        Some(inline) => {
            let image = ImagePayload::from_base64(inline.mime_type.clone(), &inline.data)?;
            tracing::debug!(
                mime_type = %image.mime_type,
                size = image.size(),
                "received inline image"
            );
            Ok(Outcome::Image(image))
        }
        None => Ok(Outcome::Absent),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeBackend, Reply};
    use super::wire::{RequestPart, ResponsePart};
    use super::*;
    use crate::error::StudioError;

    fn jpeg() -> ImagePayload {
        ImagePayload::new("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    #[tokio::test]
    async fn test_request_edit_sends_image_then_instruction() {
        let adapter = RequestAdapter::new(
            FakeBackend::new().reply_parts(vec![ResponsePart::inline("image/png", "AQID")]),
        );

        let outcome = adapter.request_edit(&jpeg(), "add a red hat").await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Image(ImagePayload::new("image/png", vec![1, 2, 3]))
        );

        let sent = adapter.backend().last_request();
        assert!(sent.system_instruction.is_none());
        assert_eq!(sent.generation_config.response_modalities, vec!["IMAGE"]);
        let parts = &sent.contents[0].parts;
        assert_eq!(parts.len(), 2);
        match &parts[0] {
            RequestPart::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/jpeg");
                assert_eq!(inline_data.data, jpeg().to_base64());
            }
            other => panic!("expected inline data first, got {other:?}"),
        }
        assert!(matches!(&parts[1], RequestPart::Text { text } if text == "add a red hat"));
    }

    #[tokio::test]
    async fn test_request_generation_uses_style_instruction() {
        let adapter = RequestAdapter::new(
            FakeBackend::new()
                .reply_parts(vec![ResponsePart::inline("image/png", "AQID")])
                .reply_parts(vec![ResponsePart::inline("image/png", "AQID")]),
        );

        for style in StyleVariant::ALL {
            adapter.request_generation("a gearbox", style).await.unwrap();
            let sent = adapter.backend().last_request();
            let system = sent.system_instruction.expect("system instruction");
            assert!(
                matches!(&system.parts[0], RequestPart::Text { text } if text == style.instruction())
            );
            assert_eq!(sent.contents[0].parts.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_first_inline_image_wins() {
        let adapter = RequestAdapter::new(FakeBackend::new().reply_parts(vec![
            ResponsePart::text("Here you go"),
            ResponsePart::inline("image/webp", "AQ=="),
            ResponsePart::inline("image/png", "Ag=="),
        ]));

        let outcome = adapter
            .request_generation("a bridge", StyleVariant::Blueprint)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Image(ImagePayload::new("image/webp", vec![1]))
        );
    }

    #[tokio::test]
    async fn test_text_only_response_is_absent() {
        let adapter = RequestAdapter::new(
            FakeBackend::new().reply_parts(vec![ResponsePart::text("I can't draw that")]),
        );
        let outcome = adapter
            .request_generation("a turbine", StyleVariant::Rendered3d)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Absent);
    }

    #[tokio::test]
    async fn test_empty_response_is_absent() {
        let adapter = RequestAdapter::new(FakeBackend::new());
        let outcome = adapter.request_edit(&jpeg(), "crop it").await.unwrap();
        assert_eq!(outcome, Outcome::Absent);
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let adapter = RequestAdapter::new(FakeBackend::new().reply(Reply::Error(
            StudioError::Api {
                status: 500,
                message: "internal".into(),
            },
        )));
        let err = adapter.request_edit(&jpeg(), "sharpen").await.unwrap_err();
        assert!(matches!(err, StudioError::Api { status: 500, .. }));
        assert_eq!(adapter.backend().call_count(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_image_is_error() {
        let adapter = RequestAdapter::new(
            FakeBackend::new().reply_parts(vec![ResponsePart::inline("image/png", "%%%")]),
        );
        let err = adapter.request_edit(&jpeg(), "sharpen").await.unwrap_err();
        assert!(matches!(err, StudioError::Decode(_)));
    }

    #[tokio::test]
    async fn test_arc_backend_forwards() {
        let backend = std::sync::Arc::new(FakeBackend::new());
        let adapter = RequestAdapter::new(backend.clone());
        assert_eq!(adapter.backend().name(), "fake");
        assert!(adapter.backend().health_check().await.is_ok());
        adapter.request_edit(&jpeg(), "crop it").await.unwrap();
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_run_edit_and_generation() {
        let adapter = RequestAdapter::new(
            FakeBackend::new()
                .reply_parts(vec![ResponsePart::inline("image/png", "AQID")])
                .reply_parts(vec![]),
        );
        let edit = EditRequest {
            source: jpeg(),
            instruction: "brighten".into(),
        };
        assert!(adapter.run_edit(&edit).await.unwrap().into_image().is_some());

        let generation = GenerationRequest {
            description: "a crane".into(),
            style: StyleVariant::Blueprint,
        };
        assert_eq!(
            adapter.run_generation(&generation).await.unwrap(),
            Outcome::Absent
        );
    }
}
