//! Image payload module.

mod types;

pub use types::{ImageFormat, ImagePayload, SelectedFile, DEFAULT_MIME_TYPE};
