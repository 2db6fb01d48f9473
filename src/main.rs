//! statwatch binary: runs the observe/diff/notify loop on an interval.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use statwatch::{
    FailureReporter, FileSource, LogNotifier, LogSink, Settings, ValueStore, Watcher,
};

#[derive(Parser, Debug)]
#[command(name = "statwatch")]
#[command(about = "Watches per-track streaming counters and notifies on real change")]
struct Args {
    /// Path to a settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON document to observe each tick
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Directory holding the per-year history documents
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Seconds between ticks
    #[arg(short, long)]
    interval: Option<u64>,

    /// Run a single tick and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(file) = args.file {
        settings.values_file = file;
    }
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }
    if let Some(interval) = args.interval {
        settings.interval_secs = interval;
    }

    let store = ValueStore::open(&settings.data_dir)?;
    let source = Box::new(FileSource::new(&settings.values_file));
    let reporter = FailureReporter::new(Box::<LogSink>::default());
    let mut watcher = Watcher::new(
        source,
        Box::<LogNotifier>::default(),
        store,
        reporter,
        settings.chat_ids.clone(),
    );

    info!(
        file = %settings.values_file.display(),
        data_dir = %settings.data_dir.display(),
        interval_secs = settings.interval_secs,
        "statwatch started"
    );

    if args.once {
        let outcome = watcher.tick();
        info!(?outcome, "single tick finished");
        return Ok(());
    }

    let mut interval = time::interval(Duration::from_secs(settings.interval_secs.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let outcome = watcher.tick();
        debug!(?outcome, "tick finished");
    }
}
