//! The `vista color` command: average color of local images.

use clap::Args;
use std::path::PathBuf;
use vista_core::{CatalogWriter, ColorReport, ColorSampler, Config, Rgb};

use super::OutputFormat;

/// Arguments for the `color` command.
#[derive(Args, Debug)]
pub struct ColorArgs {
    /// Image files to sample
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Longest edge of the sampling grid in pixels
    #[arg(long)]
    pub grid: Option<u32>,

    /// Minimum alpha (0-255) for a pixel to count
    #[arg(long)]
    pub alpha_threshold: Option<u8>,

    /// Color reported when an image cannot be sampled (#rrggbb)
    #[arg(long)]
    pub fallback: Option<Rgb>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    pub format: OutputFormat,
}

/// Execute the color command.
pub async fn execute(args: ColorArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(grid) = args.grid {
        anyhow::ensure!(grid > 0, "--grid must be > 0");
        config.color.grid_size = grid;
    }
    if let Some(threshold) = args.alpha_threshold {
        config.color.alpha_threshold = threshold;
    }
    if let Some(fallback) = args.fallback {
        config.color.fallback = fallback;
    }

    let reports = sample_all(&args.images, &ColorSampler::new(&config.color)).await?;

    let mut writer = CatalogWriter::new(std::io::stdout().lock(), args.format.into(), false);
    match args.format {
        OutputFormat::Json => writer.write_record(&reports)?,
        OutputFormat::Jsonl => {
            for report in &reports {
                writer.write_record(report)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

async fn sample_all(images: &[PathBuf], sampler: &ColorSampler) -> anyhow::Result<Vec<ColorReport>> {
    let mut reports = Vec::with_capacity(images.len());
    for path in images {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let color = sampler.sample_bytes(&bytes);
        tracing::debug!("{} -> {}", path.display(), color);
        reports.push(ColorReport::new(path.display().to_string(), color));
    }
    Ok(reports)
}
