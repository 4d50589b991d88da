//! Error types for the studio.

use crate::controller::Workflow;

/// Errors that can occur while editing or generating images.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// A required input was missing. No network call was made.
    #[error("missing input: {0}")]
    Validation(String),

    /// The selected file could not be turned into an image payload.
    #[error("failed to read file: {0}")]
    Read(String),

    /// A request for this workflow is already in flight.
    #[error("{0} request already in progress")]
    Busy(Workflow),

    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving a result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The controller task has shut down.
    #[error("studio controller is no longer running")]
    ControllerClosed,
}

/// The three error classes a user ever sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Required input missing, or a submission overlapping a pending one.
    Validation,
    /// Local file could not be decoded.
    Read,
    /// Remote call failed or the studio could not complete it.
    Generation,
}

impl StudioError {
    /// Classifies this error for display.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) | Self::Busy(_) => ErrorClass::Validation,
            Self::Read(_) => ErrorClass::Read,
            _ => ErrorClass::Generation,
        }
    }

    /// Returns true if the error happened before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(self.class(), ErrorClass::Validation | ErrorClass::Read)
    }
}

/// Maximum length of an upstream error body kept in an error value.
const MAX_ERROR_BODY: usize = 500;

/// Redacts API keys from an upstream error body and truncates it.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let redacted: String = text
        .split_inclusive(|c: char| c.is_whitespace() || c == '"' || c == '&' || c == '?')
        .map(|token| {
            let trimmed = token.trim_end_matches(|c: char| {
                c.is_whitespace() || c == '"' || c == '&' || c == '?'
            });
            if let Some(pos) = trimmed.find("key=") {
                let suffix = &token[trimmed.len()..];
                format!("{}key=[REDACTED]{}", &trimmed[..pos], suffix)
            } else if trimmed.starts_with("AIza") && trimmed.len() > 20 {
                let suffix = &token[trimmed.len()..];
                format!("[REDACTED]{}", suffix)
            } else {
                token.to_string()
            }
        })
        .collect();

    let trimmed = redacted.trim();
    if trimmed.chars().count() > MAX_ERROR_BODY {
        let cut: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}

/// Result type alias for studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;
