#![warn(clippy::all)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use healthpulse::{HttpProber, Poller};
use logger::LevelFilter;
use tracing::{debug, info};

mod config;
mod report;

use config::Config;
use report::Report;

/// Poll a health endpoint and report latency and availability
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the config file (created with defaults if missing)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint to poll, overrides the config file
    #[arg(short, long)]
    target: Option<String>,

    /// Polling interval in milliseconds, overrides the config file
    #[arg(short, long)]
    interval: Option<u64>,

    /// Exit after this many samples
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Print one JSON object per sample instead of text
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_with_level(if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO });

    let mut config = Config::from_config(cli.config.as_ref()).context("loading configuration")?;
    if let Some(target) = cli.target {
        config.poller.target = target;
    }
    if let Some(interval) = cli.interval {
        config.poller.interval_ms = interval;
    }
    debug!("{}", config);

    let prober = HttpProber::new(config.poller.timeout_ms)?;
    let poller = Poller::with_prober(Arc::new(prober), &config.poller.target, config.poller.interval_ms)
        .context("configuring poller")?;

    let mut samples = poller.subscribe();
    poller.start()?;

    let mut seen = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, stopping");
                break;
            }
            changed = samples.changed() => {
                if changed.is_err() {
                    break;
                }
                samples.borrow_and_update();
                seen += 1;

                let report = Report {
                    snapshot: poller.snapshot(),
                    stats: poller.stats(),
                    history: poller.history(),
                    warning_threshold_ms: config.poller.warning_threshold_ms,
                };
                if cli.json {
                    println!("{}", report.to_json()?);
                } else {
                    println!("{}", report.render());
                }

                if cli.samples.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
        }
    }

    poller.dispose();
    Ok(())
}
