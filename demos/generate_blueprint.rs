//! Blueprint generation through the studio controller, both styles.
//!
//! Run with: `cargo run --example generate_blueprint`
//!
//! Requires `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) environment variable.

use blueprint_studio::{GeminiBackend, RequestAdapter, StudioController, StyleVariant, Workflow};

#[tokio::main]
async fn main() -> blueprint_studio::Result<()> {
    let studio = StudioController::spawn(RequestAdapter::new(GeminiBackend::from_env()?));

    studio.switch_mode(Workflow::Generate).await?;
    studio
        .set_description("A small two-stage planetary gearbox with input and output shafts")
        .await?;

    for style in StyleVariant::ALL {
        studio.set_style(style).await?;
        studio.submit_generation().await?;
        let view = studio.wait_settled(Workflow::Generate).await?;

        match view.displayed_result() {
            Some(image) => {
                let path = format!("gearbox-{style}.png");
                image.save(&path)?;
                println!("Saved {path} ({} bytes)", image.size());
            }
            None => {
                if let Some(notice) = view.notice {
                    println!("{style}: {notice}");
                }
            }
        }
    }

    Ok(())
}
