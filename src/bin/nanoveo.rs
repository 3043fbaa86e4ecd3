//! Command-line front end for image editing and video generation.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use nanoveo::auth::Credentials;
use nanoveo::codec::EncodedAsset;
use nanoveo::image::{EditRequest, GeminiEditor, ImageEditorExt};
use nanoveo::video::{AspectRatio, VeoClient, VideoEvent, VideoRequest};

#[derive(Parser)]
#[command(name = "nanoveo", version, about = "Edit images with Gemini and animate them with Veo")]
struct Cli {
    /// API key. Falls back to the GOOGLE_API_KEY environment variable.
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Edit one or more images with a text prompt.
    Edit {
        /// Source image file(s). Repeat the flag to blend multiple images.
        #[arg(short, long, required = true)]
        image: Vec<PathBuf>,

        /// Editing instruction.
        #[arg(short, long)]
        prompt: String,

        /// Output file. Defaults to edited.<ext> next to the first input.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of retry attempts on transient failures.
        #[arg(long, default_value_t = 3)]
        retries: u32,

        /// Print a JSON summary instead of plain text.
        #[arg(long)]
        json: bool,
    },

    /// Animate an image into a short video.
    Video {
        /// Source image file.
        #[arg(short, long)]
        image: PathBuf,

        /// Animation instruction.
        #[arg(short, long)]
        prompt: String,

        /// Output aspect ratio.
        #[arg(long, default_value = "9:16")]
        aspect_ratio: String,

        /// Output file.
        #[arg(short, long, default_value = "output.mp4")]
        output: PathBuf,
    },

    /// Edit an image, then animate the edited result in one go.
    Pipeline {
        /// Source image file(s) for the edit step.
        #[arg(short, long, required = true)]
        image: Vec<PathBuf>,

        /// Editing instruction.
        #[arg(long)]
        edit_prompt: String,

        /// Animation instruction.
        #[arg(long)]
        video_prompt: String,

        /// Where to write the edited image.
        #[arg(long, default_value = "edited.png")]
        image_output: PathBuf,

        /// Where to write the video.
        #[arg(short, long, default_value = "output.mp4")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let credentials = match &cli.api_key {
        Some(key) => Credentials::new(key)?,
        None => Credentials::from_env()?,
    };

    match cli.command {
        Command::Edit {
            image,
            prompt,
            output,
            retries,
            json,
        } => {
            let edited = run_edit(&credentials, &image, &prompt, retries).await?;
            let output = output.unwrap_or_else(|| {
                let ext = edited.format().map(|f| f.extension()).unwrap_or("bin");
                PathBuf::from(format!("edited.{ext}"))
            });
            edited
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            if json {
                let summary = serde_json::json!({
                    "output": output,
                    "mimeType": edited.mime_type,
                    "bytes": edited.decode()?.len(),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Wrote {}", output.display());
            }
        }

        Command::Video {
            image,
            prompt,
            aspect_ratio,
            output,
        } => {
            let aspect_ratio = parse_aspect_ratio(&aspect_ratio)?;
            let asset = EncodedAsset::from_file(&image)
                .with_context(|| format!("reading {}", image.display()))?;
            let request = VideoRequest::new(prompt, asset).with_aspect_ratio(aspect_ratio);
            let video = run_video(&credentials, &request).await?;
            video
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Wrote {} ({} bytes, {} status checks)",
                output.display(),
                video.size(),
                video.metadata.polls
            );
        }

        Command::Pipeline {
            image,
            edit_prompt,
            video_prompt,
            image_output,
            output,
        } => {
            let edited = run_edit(&credentials, &image, &edit_prompt, 3).await?;
            edited
                .save(&image_output)
                .with_context(|| format!("writing {}", image_output.display()))?;
            println!("Wrote {}", image_output.display());

            let request = VideoRequest::new(video_prompt, edited);
            let video = run_video(&credentials, &request).await?;
            video
                .save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}

async fn run_edit(
    credentials: &Credentials,
    images: &[PathBuf],
    prompt: &str,
    retries: u32,
) -> anyhow::Result<EncodedAsset> {
    let editor = GeminiEditor::builder()
        .credentials(credentials.clone())
        .build()?;

    let mut request = EditRequest::new(prompt);
    for path in images {
        let asset = EncodedAsset::from_file(path)
            .with_context(|| format!("reading {}", path.display()))?;
        request = request.with_image(asset);
    }

    editor
        .edit_with_retries(&request, retries)
        .await
        .context("image edit failed")
}

async fn run_video(
    credentials: &Credentials,
    request: &VideoRequest,
) -> anyhow::Result<nanoveo::video::GeneratedVideo> {
    let veo = VeoClient::builder()
        .credentials(credentials.clone())
        .build()?;

    let mut events = veo.generate_streaming(request.clone());
    while let Some(event) = events.recv().await {
        match event {
            VideoEvent::Progress(message) => println!("{message}"),
            VideoEvent::Finished(video) => return Ok(video),
            VideoEvent::Failed(err) => return Err(err.into()),
        }
    }
    bail!("video generation ended without a result")
}

fn parse_aspect_ratio(value: &str) -> anyhow::Result<AspectRatio> {
    match value {
        "16:9" => Ok(AspectRatio::Landscape),
        "9:16" => Ok(AspectRatio::Portrait),
        other => bail!("unsupported aspect ratio {other:?} (expected 16:9 or 9:16)"),
    }
}
