use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use photo_core::{
    adapter_for, GridLayout, GridUpdate, HttpPhotoService, IndexSource, PhotoGridController,
    PhotoListState, PhotoTile, PresentationVariant, RandomIndices, TokioScheduler,
};
use serde::Serialize;
use shared::revision::{ListRevision, RevisionEquality};
use tokio_stream::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, load_settings_from, Settings};

const PREVIEW_TILES: usize = 3;
const PREVIEW_WIDTH: f64 = 390.0;

#[derive(Parser, Debug)]
#[command(about = "Fetch a photo grid and watch it reorder live")]
struct Args {
    /// Config file (defaults to ./photo_grid.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_base: Option<String>,
    #[arg(long)]
    image_host: Option<String>,
    #[arg(long)]
    interval_ms: Option<u64>,
    /// `native` reloads the grid, `diffing` emits per-item updates
    #[arg(long)]
    variant: Option<PresentationVariant>,
    /// `exact` or `length`
    #[arg(long)]
    equality: Option<RevisionEquality>,
    /// Stop after this many reorder revisions
    #[arg(long, default_value_t = 20)]
    ticks: u64,
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.api_base {
            settings.api_base = v.clone();
        }
        if let Some(v) = &self.image_host {
            settings.image_host = v.clone();
        }
        if let Some(v) = self.interval_ms {
            settings.set_tick_interval_ms(&v.to_string());
        }
        if let Some(v) = self.variant {
            settings.variant = v;
        }
        if let Some(v) = self.equality {
            settings.equality = v;
        }
    }
}

#[derive(Serialize)]
struct RevisionReport<'a> {
    variant: PresentationVariant,
    sequence: u64,
    leading_ids: Vec<i64>,
    updates: &'a [GridUpdate],
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = match &args.config {
        Some(path) => load_settings_from(path, |key| std::env::var(key).ok()),
        None => load_settings(),
    };
    args.apply(&mut settings);
    info!(
        api_base = %settings.api_base,
        variant = %settings.variant,
        equality = %settings.equality,
        interval_ms = settings.tick_interval_ms,
        "starting photo grid"
    );

    let service = HttpPhotoService::new(&settings.api_base).context("invalid api base")?;
    let indices: Box<dyn IndexSource> = match args.seed {
        Some(seed) => Box::new(RandomIndices::seeded(seed)),
        None => Box::new(RandomIndices::from_entropy()),
    };
    let scheduler = TokioScheduler::from_current().context("no tokio runtime")?;
    let list = PhotoListState::with_options(Arc::new(scheduler), settings.tick_interval(), indices);
    let controller = PhotoGridController::new(Arc::new(service), list);

    let mut adapter = adapter_for(settings.variant, settings.equality);
    let mut revisions = controller.list().revisions();

    let count = controller
        .fetch_and_start()
        .await
        .context("failed to fetch photos")?;
    preview_tiles(&controller.list().snapshot(), &settings.image_host);
    if count < 2 {
        info!(count, "nothing to reorder");
        return Ok(());
    }

    // The first revision received is the initial load.
    let mut received: u64 = 0;
    while received <= args.ticks {
        let next = tokio::select! {
            next = revisions.next() => next,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        };
        let revision = match next {
            Some(Ok(revision)) => revision,
            Some(Err(err)) => {
                warn!("presentation fell behind: {err}");
                continue;
            }
            None => break,
        };

        let updates = adapter.apply(&revision);
        let report = RevisionReport {
            variant: adapter.variant(),
            sequence: revision.sequence(),
            leading_ids: revision
                .photos()
                .iter()
                .take(8)
                .map(|photo| photo.id.0)
                .collect(),
            updates: &updates,
        };
        println!("{}", serde_json::to_string(&report)?);
        received += 1;
    }

    controller.shutdown();
    info!(reorders = received.saturating_sub(1), "photo grid finished");
    Ok(())
}

fn preview_tiles(revision: &ListRevision, image_host: &str) {
    let layout = GridLayout::default();
    let side = layout.tile_side(PREVIEW_WIDTH);
    for (index, record) in revision.photos().iter().take(PREVIEW_TILES).enumerate() {
        match PhotoTile::from_record(record, image_host) {
            Ok(tile) => {
                let (row, column) = layout.position(index);
                info!(
                    photo_id = %tile.id,
                    row,
                    column,
                    side,
                    placeholder = ?tile.placeholder,
                    placeholder_rgb = ?tile.placeholder.rgb(),
                    thumbnail = %tile.thumbnail_url,
                    "tile: {}",
                    tile.title
                );
            }
            Err(err) => warn!(photo_id = %record.id, "cannot build thumbnail url: {err}"),
        }
    }
}
