#![warn(missing_docs)]
//! Blueprint Studio - edit photos and generate technical blueprints with
//! Gemini image models.
//!
//! The crate has two layers:
//!
//! - [`adapter`]: turns an edit or a blueprint description into a single
//!   `generateContent` call and extracts the first inline image.
//! - [`controller`]: holds the user-facing state of both workflows and runs
//!   submissions through the adapter, one owner, no overlapping requests.
//!
//! # Quick Start
//!
//! ```no_run
//! use blueprint_studio::{GeminiBackend, RequestAdapter, StudioController, Workflow};
//!
//! #[tokio::main]
//! async fn main() -> blueprint_studio::Result<()> {
//!     let adapter = RequestAdapter::new(GeminiBackend::from_env()?);
//!     let studio = StudioController::spawn(adapter);
//!
//!     studio.select_path("cat.jpg").await?;
//!     studio.set_instruction("add a red hat").await?;
//!     studio.submit_edit().await?;
//!
//!     let view = studio.wait_settled(Workflow::Edit).await?;
//!     if let Some(image) = view.displayed_result() {
//!         image.save("cat-with-hat.jpg")?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod controller;
mod error;
pub mod image;

// Re-export error types at crate root
pub use error::{ErrorClass, Result, StudioError};

pub use adapter::{
    EditRequest, GeminiBackend, GenerationBackend, GenerationRequest, Outcome, RequestAdapter,
    StyleVariant,
};
pub use config::{GeminiModel, StudioConfig, StudioConfigBuilder};
pub use controller::{Notice, Phase, Studio, StudioController, StudioHandle, StudioView, Workflow};
pub use image::{ImageFormat, ImagePayload, SelectedFile};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::adapter::{GenerationBackend, Outcome, RequestAdapter, StyleVariant};
    pub use crate::controller::{StudioController, StudioHandle, Workflow};
    pub use crate::error::{Result, StudioError};
    pub use crate::image::{ImagePayload, SelectedFile};
}
