//! The `vista catalog` command: fetch once, filter, print.

use clap::Args;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use vista_core::{
    Action, CatalogWriter, CategoryFilter, Config, FetchOptions, FetchOutcome, FilePhotoSource,
    GalleryView, HttpPhotoSource, PhotoFetcher, PhotoSource, Store, Vista,
};

use super::OutputFormat;

/// Arguments for the `catalog` command.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Category to show ("all" for every photo)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Local JSON catalog to read instead of the configured source
    #[arg(long, conflicts_with = "endpoint")]
    pub file: Option<PathBuf>,

    /// Catalog endpoint to fetch instead of the configured source
    #[arg(long, env = "VISTA_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Tag thumbnail URLs with a cache-busting timestamp
    #[arg(long)]
    pub cache_bust: bool,
}

/// Execute the catalog command.
pub async fn execute(args: CatalogArgs, mut config: Config) -> anyhow::Result<()> {
    if args.cache_bust {
        config.source.cache_bust = true;
    }
    let source = select_source(&args, &config);
    let store = Store::from_config(&config);

    if let Some(category) = &args.category {
        let state = store.dispatch(Action::SetCategory(category.clone()));
        if &state.gallery.category != category {
            anyhow::bail!(
                "Unknown category '{}'. Known categories: {}",
                category,
                config.known_categories().join(", ")
            );
        }
    }

    let fetcher = PhotoFetcher::new(store.clone(), source, FetchOptions::from(&config.source));
    match fetcher.fetch().await? {
        FetchOutcome::Applied { count } => tracing::debug!("Fetched {} photos", count),
        FetchOutcome::Failed { reason } => tracing::debug!("Fetch failed: {}", reason),
        FetchOutcome::Superseded => {}
    }

    let filter = CategoryFilter::new();
    let photos = match GalleryView::derive(&store.get_state().gallery, &filter) {
        GalleryView::Ready(photos) => photos,
        GalleryView::Error { reason } => anyhow::bail!("Catalog fetch failed ({reason})"),
        GalleryView::Loading => anyhow::bail!("Catalog fetch did not complete"),
    };

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = CatalogWriter::new(writer, args.format.into(), args.pretty);
    writer.write_photos(&photos)?;
    writer.flush()?;

    tracing::info!(
        "{} of {} photos in '{}'",
        photos.len(),
        store.get_state().gallery.photos.len(),
        store.get_state().gallery.category
    );
    Ok(())
}

fn select_source(args: &CatalogArgs, config: &Config) -> Arc<dyn PhotoSource> {
    if let Some(path) = &args.file {
        return Arc::new(FilePhotoSource::new(path.clone()));
    }
    if let Some(endpoint) = &args.endpoint {
        let mut source = config.source.clone();
        source.endpoint = endpoint.clone();
        return Arc::new(HttpPhotoSource::from_config(&source));
    }
    Vista::source_for(config)
}
