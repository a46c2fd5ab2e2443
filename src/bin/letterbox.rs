use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context as _;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use walkdir::WalkDir;

use letterbox::{AspectRatio, Background, Processor, ProcessorConfig, default_concurrency};

#[derive(Parser, Debug)]
#[command(
    name = "letterbox",
    version,
    about = "Batch letterbox/pillarbox images to a target aspect ratio"
)]
struct Cli {
    /// Image output directory.
    #[arg(long, default_value = "processed")]
    output: PathBuf,

    /// Fill the letterbox with white instead of black.
    #[arg(long, default_value_t = false)]
    white: bool,

    /// Output aspect ratio, as "A:B".
    #[arg(long, default_value = "16:9")]
    aspect: String,

    /// JPEG output quality (0-100).
    #[arg(long, default_value_t = 90)]
    quality: u8,

    /// Padding, as a percentage of the canvas dimensions.
    #[arg(long, default_value_t = 0)]
    padding: u32,

    /// Number of images processed concurrently.
    #[arg(long, default_value_t = default_concurrency())]
    concurrency: usize,

    /// Reprocess images whose output is already up to date.
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Print the final report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Images to process. When empty, images in the current directory are
    /// used.
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();

    let mut config = ProcessorConfig::new(&cli.output);
    config.aspect = AspectRatio::parse(&cli.aspect)?;
    config.background = if cli.white {
        Background::White
    } else {
        Background::Black
    };
    config.quality = cli.quality;
    config.padding_percent = cli.padding;
    config.concurrency = cli.concurrency;
    config.force = cli.force;
    let processor = Processor::new(config)?;

    let images = if cli.images.is_empty() {
        list_images(Path::new("."))?
    } else {
        cli.images
    };

    // Ctrl-C stops new admissions; in-flight images still finish cleanly.
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing in-flight images");
            interrupt.cancel();
        }
    });

    info!("processing {} images", images.len());
    let start = Instant::now();
    let report = processor.process(images, &cancel).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        info!(
            "processed {} images ({} skipped) in {:.1?}",
            report.processed.len(),
            report.skipped.len(),
            start.elapsed()
        );
    }
    Ok(())
}

/// List images directly inside `dir` (non-recursive), in a stable order.
fn list_images(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("listing images in '{}'", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        if matches!(ext.as_deref(), Some("jpg" | "jpeg" | "png")) {
            images.push(path);
        }
    }
    Ok(images)
}
