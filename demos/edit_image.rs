//! Image editing example - modifies an existing image with a text prompt.
//!
//! Run with: `cargo run --example edit_image -- <input_image.jpg>`
//!
//! Requires `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) environment variable.

use blueprint_studio::{GeminiBackend, Outcome, RequestAdapter, SelectedFile};

#[tokio::main]
async fn main() -> blueprint_studio::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: edit_image <input_image>");

    let source = SelectedFile::from_path(&input_path)?.into_payload()?;
    let adapter = RequestAdapter::new(GeminiBackend::from_env()?);

    match adapter
        .request_edit(&source, "Turn this into a pencil sketch with a red hat on the subject")
        .await?
    {
        Outcome::Image(image) => {
            let image = image.retagged(source.mime_type.clone());
            let path = format!("edited.{}", image.format().unwrap_or_default().extension());
            image.save(&path)?;
            println!(
                "Edited image saved to {path} ({} bytes, {})",
                image.size(),
                image.mime_type
            );
        }
        Outcome::Absent => println!("No image was returned. Try a different prompt."),
    }

    Ok(())
}
