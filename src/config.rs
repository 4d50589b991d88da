//! Process-wide configuration, resolved once at startup.

use crate::error::{Result, StudioError};

/// Default Gemini API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables checked for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Environment variable overriding the model identifier.
pub const MODEL_ENV_VAR: &str = "BLUEPRINT_STUDIO_MODEL";

/// Environment variable overriding the API host.
pub const BASE_URL_ENV_VAR: &str = "BLUEPRINT_STUDIO_BASE_URL";

/// Gemini image model variants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    NanoBananaPro,
    /// Any other model identifier.
    Custom(String),
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "gemini-3-pro-image-preview",
            Self::Custom(id) => id,
        }
    }

    /// Parses a model identifier, recognising the known variants.
    pub fn from_id(id: &str) -> Self {
        match id {
            "gemini-2.5-flash-image" => Self::NanoBanana,
            "gemini-3-pro-image-preview" => Self::NanoBananaPro,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// Resolved configuration for talking to the generation API.
#[derive(Clone)]
pub struct StudioConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Model used for both workflows.
    pub model: GeminiModel,
    /// API host, without a trailing slash.
    pub base_url: String,
}

impl std::fmt::Debug for StudioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl StudioConfig {
    /// Creates a new `StudioConfigBuilder`.
    pub fn builder() -> StudioConfigBuilder {
        StudioConfigBuilder::new()
    }

    /// Resolves everything from the environment.
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }
}

/// Builder for [`StudioConfig`]. Unset values fall back to the environment.
#[derive(Debug, Clone, Default)]
pub struct StudioConfigBuilder {
    api_key: Option<String>,
    model: Option<GeminiModel>,
    base_url: Option<String>,
}

impl StudioConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GEMINI_API_KEY`, then `GOOGLE_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model. Falls back to `BLUEPRINT_STUDIO_MODEL`.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the API host. Falls back to `BLUEPRINT_STUDIO_BASE_URL`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the configuration, resolving the API key.
    pub fn build(self) -> Result<StudioConfig> {
        let api_key = resolve_api_key(self.api_key, |var| std::env::var(var).ok())
            .ok_or_else(|| {
                StudioError::Auth("GEMINI_API_KEY not set and no API key provided".into())
            })?;

        let model = self
            .model
            .or_else(|| {
                std::env::var(MODEL_ENV_VAR)
                    .ok()
                    .map(|id| GeminiModel::from_id(&id))
            })
            .unwrap_or_default();

        let base_url = self
            .base_url
            .or_else(|| std::env::var(BASE_URL_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(StudioError::Config(format!(
                "base URL must start with http:// or https://, got {base_url}"
            )));
        }

        Ok(StudioConfig {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// An explicit key wins; otherwise the first non-blank variable of
/// [`API_KEY_ENV_VARS`] is used.
fn resolve_api_key(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let usable = |key: &String| !key.trim().is_empty();
    match explicit {
        Some(key) => Some(key).filter(usable),
        None => API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .find(usable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(
            GeminiModel::NanoBananaPro.as_str(),
            "gemini-3-pro-image-preview"
        );
        assert_eq!(GeminiModel::Custom("x".into()).as_str(), "x");
    }

    #[test]
    fn test_gemini_model_from_id() {
        assert_eq!(
            GeminiModel::from_id("gemini-2.5-flash-image"),
            GeminiModel::NanoBanana
        );
        assert_eq!(
            GeminiModel::from_id("imagen-x"),
            GeminiModel::Custom("imagen-x".into())
        );
    }

    #[test]
    fn test_builder_with_explicit_values() {
        let config = StudioConfig::builder()
            .api_key("test-key")
            .model(GeminiModel::NanoBananaPro)
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, GeminiModel::NanoBananaPro);
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_builder_rejects_blank_key() {
        let err = StudioConfig::builder().api_key("  ").build().unwrap_err();
        assert!(matches!(err, StudioError::Auth(_)));
    }

    #[test]
    fn test_api_key_skips_blank_variables() {
        let env = |var: &str| match var {
            "GEMINI_API_KEY" => Some(String::new()),
            "GOOGLE_API_KEY" => Some("google-key".to_string()),
            _ => None,
        };
        assert_eq!(resolve_api_key(None, env).as_deref(), Some("google-key"));
        assert_eq!(
            resolve_api_key(Some("flag-key".into()), env).as_deref(),
            Some("flag-key")
        );
        assert_eq!(resolve_api_key(None, |_| Some("  ".into())), None);
    }

    #[test]
    fn test_api_key_prefers_gemini_variable() {
        let env = |var: &str| Some(format!("{var}-value"));
        assert_eq!(
            resolve_api_key(None, env).as_deref(),
            Some("GEMINI_API_KEY-value")
        );
    }

    #[test]
    fn test_builder_rejects_bad_base_url() {
        let err = StudioConfig::builder()
            .api_key("k")
            .base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, StudioError::Config(_)));
    }

    #[test]
    fn test_debug_hides_key() {
        let config = StudioConfig::builder()
            .api_key("super-secret")
            .base_url(DEFAULT_BASE_URL)
            .build()
            .unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
