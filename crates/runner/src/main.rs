use anyhow::Context;
use l2book::{OrderBook, ScriptedFeed, load_config, load_default_config};
use l2book_runner::{RunnerArgs, TopOfBook, log_events};
use log::{error, info};
use std::path::Path;
use std::time::Duration;

/// Interval between top-of-book log lines
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = RunnerArgs::parse(std::env::args().skip(1)).map_err(anyhow::Error::msg)?;
    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_default_config()?,
    };
    info!("Starting l2book runner for {}", config.product_id);

    // Construction blocks until the first snapshot
    let book = match args.replay {
        Some(path) => {
            let feed = replay_feed(&path)?;
            tokio::task::spawn_blocking(move || OrderBook::with_transport(config, feed)).await??
        }
        None => tokio::task::spawn_blocking(move || OrderBook::start(config)).await??,
    };

    let mut interval = tokio::time::interval(REPORT_INTERVAL);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
            _ = interval.tick() => {
                if log_events(&book) {
                    error!("Feed is gone; book updates are frozen");
                }
                info!("{}", TopOfBook::capture(&book));
            }
        }
    }

    let (snapshots, updates) = (book.stats().snapshots(), book.stats().updates());
    tokio::task::spawn_blocking(move || book.shutdown()).await??;
    info!(
        "Runner stopped after {} snapshots and {} updates",
        snapshots, updates
    );
    Ok(())
}

/// One payload per non-empty line
fn replay_feed(path: &Path) -> anyhow::Result<ScriptedFeed> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay file {}", path.display()))?;
    let payloads: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    info!("Replaying {} payloads from {}", payloads.len(), path.display());
    Ok(ScriptedFeed::new(payloads).with_interval(Duration::from_millis(10)))
}
