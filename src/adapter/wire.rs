//! `generateContent` request and response bodies.

use serde::{Deserialize, Serialize};

/// Response modality that restricts the model to image output.
pub const IMAGE_MODALITY: &str = "IMAGE";

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Ordered contents; this crate always sends exactly one.
    pub contents: Vec<Content>,
    /// Accepted response modalities.
    pub generation_config: GenerationConfig,
    /// Fixed system-level instruction, sent only for text-to-image requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

/// An ordered list of parts.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    /// Parts in send order.
    pub parts: Vec<RequestPart>,
}

/// A part in a request - either text or inline image data.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    /// Plain text.
    Text {
        /// The text itself.
        text: String,
    },
    /// Inline binary data.
    InlineData {
        /// Encoded data with its media type.
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 data paired with its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// Media type label, e.g. `image/png`.
    pub mime_type: String,
    /// Standard base64 of the raw bytes.
    pub data: String,
}

/// Generation settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Modalities the response may contain.
    pub response_modalities: Vec<String>,
}

impl GenerationConfig {
    /// Config that only accepts image-bearing responses.
    pub fn image_only() -> Self {
        Self {
            response_modalities: vec![IMAGE_MODALITY.to_string()],
        }
    }
}

impl GenerateContentRequest {
    /// Inline image first, then the instruction text.
    pub fn image_edit(inline: InlineData, instruction: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: inline,
                    },
                    RequestPart::Text {
                        text: instruction.into(),
                    },
                ],
            }],
            generation_config: GenerationConfig::image_only(),
            system_instruction: None,
        }
    }

    /// Text-only prompt with a system instruction.
    pub fn text_to_image(prompt: impl Into<String>, system_instruction: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![RequestPart::Text {
                    text: prompt.into(),
                }],
            }],
            generation_config: GenerationConfig::image_only(),
            system_instruction: Some(Content {
                parts: vec![RequestPart::Text {
                    text: system_instruction.to_string(),
                }],
            }),
        }
    }
}

/// Body returned by `generateContent`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate results; only the first is read.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Present when the prompt itself was blocked.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One candidate result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content, absent when the candidate was filtered.
    #[serde(default)]
    pub content: Option<CandidateContent>,
    /// Why generation stopped (`STOP`, `IMAGE_SAFETY`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Parts of a candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    /// Parts in the order the model produced them.
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    /// Text, if this is a text part.
    #[serde(default)]
    pub text: Option<String>,
    /// Inline data, if this is an image part.
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

/// Prompt-level block information.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Block reason, e.g. `SAFETY`.
    #[serde(default)]
    pub block_reason: Option<String>,
    /// Human-readable block message.
    #[serde(default)]
    pub block_reason_message: Option<String>,
}

impl ResponsePart {
    /// A text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// An inline data part with an already encoded body.
    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

impl GenerateContentResponse {
    /// A response with a single candidate holding `parts`.
    pub fn with_parts(parts: Vec<ResponsePart>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(CandidateContent { parts }),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
        }
    }

    /// Inline data of the first image part of the first candidate.
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_edit_serialization() {
        let req = GenerateContentRequest::image_edit(
            InlineData {
                mime_type: "image/jpeg".into(),
                data: "AQID".into(),
            },
            "add a red hat",
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "parts": [
                        {"inlineData": {"mimeType": "image/jpeg", "data": "AQID"}},
                        {"text": "add a red hat"}
                    ]
                }],
                "generationConfig": {"responseModalities": ["IMAGE"]}
            })
        );
    }

    #[test]
    fn test_text_to_image_has_system_instruction() {
        let req = GenerateContentRequest::text_to_image("a bridge", "draw blueprints");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "a bridge");
        assert_eq!(
            value["systemInstruction"]["parts"][0]["text"],
            "draw blueprints"
        );
        assert!(value.get("system_instruction").is_none());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your image"},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.candidates[0].finish_reason.as_deref(), Some("STOP"));
        let inline = resp.first_inline_image().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "iVBORw0KGgo=");
    }

    #[test]
    fn test_first_inline_image_only_reads_first_candidate() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "no image here"}]}},
                {"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AA=="}}]}}
            ]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(resp.first_inline_image().is_none());
    }

    #[test]
    fn test_response_with_prompt_feedback_block() {
        let json = r#"{
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(resp.candidates.is_empty());
        assert!(resp.first_inline_image().is_none());
        let feedback = resp.prompt_feedback.unwrap();
        assert_eq!(feedback.block_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_candidate_without_content() {
        let json = r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(resp.candidates[0].content.is_none());
        assert!(resp.first_inline_image().is_none());
    }
}
