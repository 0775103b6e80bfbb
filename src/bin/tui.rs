use anyhow::{Context, Result};
use moncal::config::Config;
use moncal::storage::LocalStorage;
use moncal::store::EventStore;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// The terminal belongs to the UI, so logs go to a file next to the data.
fn init_logging(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("moncal.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moncal=info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let config = Config::load()?;
    let data_dir = config
        .resolve_data_dir()
        .context("Could not determine a data directory; set MONCAL_DATA_DIR")?;
    init_logging(&data_dir)?;

    let storage = LocalStorage::new(&data_dir);
    info!(path = %storage.path().display(), "opening event store");
    let store = EventStore::open(storage);

    moncal::tui::run(&config, store)
}
