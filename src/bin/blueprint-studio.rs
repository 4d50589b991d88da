//! CLI for Blueprint Studio - image edits and blueprint generation.

use blueprint_studio::{
    GeminiBackend, GeminiModel, GenerationBackend, ImagePayload, Phase, RequestAdapter,
    StudioConfig, StudioController, StudioHandle, StudioView, StyleVariant, Workflow,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blueprint-studio")]
#[command(about = "Edit images and generate technical blueprints with Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Gemini API key (falls back to GOOGLE_API_KEY)
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long, global = true, env = "BLUEPRINT_STUDIO_MODEL")]
    model: Option<String>,

    /// API host
    #[arg(long, global = true, env = "BLUEPRINT_STUDIO_BASE_URL")]
    base_url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit an image according to a text instruction
    Edit(EditArgs),

    /// Generate a blueprint image from a description
    Generate(GenerateArgs),

    /// Check that the API key and model are usable
    Check,
}

#[derive(Args)]
struct EditArgs {
    /// Image to edit
    input: PathBuf,

    /// What to change
    #[arg(short, long)]
    prompt: String,

    /// Output file path (defaults to edited.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the result as a data URL
    #[arg(long)]
    data_url: bool,
}

#[derive(Args)]
struct GenerateArgs {
    /// Description of the object or structure
    description: String,

    /// Rendering style
    #[arg(short, long, value_enum, default_value = "blueprint")]
    style: StyleArg,

    /// Output file path (defaults to blueprint.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the result as a data URL
    #[arg(long)]
    data_url: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleArg {
    /// Flat technical blueprint
    Blueprint,
    /// Three-dimensional render
    #[value(name = "3d")]
    Rendered3d,
}

impl From<StyleArg> for StyleVariant {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Blueprint => StyleVariant::Blueprint,
            StyleArg::Rendered3d => StyleVariant::Rendered3d,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blueprint_studio=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let backend = GeminiBackend::new(build_config(&cli)?);

    match cli.command {
        Commands::Edit(args) => edit_image(backend, args, cli.json).await,
        Commands::Generate(args) => generate_blueprint(backend, args, cli.json).await,
        Commands::Check => check(backend, cli.json).await,
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<StudioConfig> {
    let mut builder = StudioConfig::builder();
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(GeminiModel::from_id(model));
    }
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url);
    }
    Ok(builder.build()?)
}

async fn edit_image(
    backend: GeminiBackend,
    args: EditArgs,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let studio = StudioController::spawn(RequestAdapter::new(backend));

    if studio.select_path(&args.input).await.is_err() {
        return report(&studio.view(), Workflow::Edit, None, false, json);
    }
    studio.set_instruction(&args.prompt).await?;

    let view = submit_and_wait(&studio, Workflow::Edit).await?;
    let output = args.output.or_else(|| {
        view.displayed_result()
            .map(|image| PathBuf::from(format!("edited.{}", extension_for(image))))
    });
    report(&view, Workflow::Edit, output.as_deref(), args.data_url, json)
}

async fn generate_blueprint(
    backend: GeminiBackend,
    args: GenerateArgs,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let studio = StudioController::spawn(RequestAdapter::new(backend));

    studio.switch_mode(Workflow::Generate).await?;
    studio.set_description(&args.description).await?;
    studio.set_style(args.style.into()).await?;

    let view = submit_and_wait(&studio, Workflow::Generate).await?;
    let output = args.output.unwrap_or_else(|| PathBuf::from("blueprint.png"));
    report(&view, Workflow::Generate, Some(&output), args.data_url, json)
}

async fn submit_and_wait(
    studio: &StudioHandle,
    workflow: Workflow,
) -> anyhow::Result<StudioView> {
    let submitted = match workflow {
        Workflow::Edit => studio.submit_edit().await,
        Workflow::Generate => studio.submit_generation().await,
    };
    match submitted {
        Ok(ticket) => {
            tracing::info!(%workflow, ticket, "request submitted, waiting for the model");
            Ok(studio.wait_settled(workflow).await?)
        }
        Err(e) if e.is_local() => Ok(studio.view()),
        Err(e) => Err(e.into()),
    }
}

fn extension_for(image: &ImagePayload) -> &'static str {
    image.format().unwrap_or_default().extension()
}

fn report(
    view: &StudioView,
    workflow: Workflow,
    output: Option<&Path>,
    data_url: bool,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let image = view.result_of(workflow);
    let succeeded = view.phase_of(workflow) == Phase::Succeeded && image.is_some();

    if let (Some(image), Some(path)) = (image, output) {
        image.save(path)?;
    }

    if json {
        let result = serde_json::json!({
            "workflow": workflow.to_string(),
            "success": succeeded,
            "output": output.filter(|_| succeeded).map(|p| p.display().to_string()),
            "mime_type": image.map(|i| i.mime_type.clone()),
            "size_bytes": image.map(|i| i.size()),
            "message": view.notice.as_ref().map(|n| n.message()),
            "data_url": image.filter(|_| data_url).map(|i| i.to_data_url()),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some(image) = image {
        if let Some(path) = output {
            println!(
                "Saved {} ({} bytes, {})",
                path.display(),
                image.size(),
                image.mime_type
            );
        }
        if data_url {
            println!("{}", image.to_data_url());
        }
    } else if let Some(notice) = &view.notice {
        eprintln!("{notice}");
    }

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn check(backend: GeminiBackend, json: bool) -> anyhow::Result<ExitCode> {
    let model = backend.model().to_string();
    let result = backend.health_check().await;

    if json {
        let body = serde_json::json!({
            "backend": backend.name(),
            "model": model,
            "ok": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        match &result {
            Ok(()) => println!("✓ {} ({}) is reachable", backend.name(), model),
            Err(e) => eprintln!("✗ {} ({}): {}", backend.name(), model, e),
        }
    }

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

