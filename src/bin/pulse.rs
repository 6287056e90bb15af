use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use macro_pulse::{
    config::Config,
    delta::{DeltaEngine, ThresholdTable},
    notify, report,
    resolver::MetricResolver,
    storage::json::JsonFileStore,
    tick::Tick,
};
use tracing::{debug, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Sample macro and crypto indicators once and report what changed
#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short, long)]
    file: Option<String>,

    /// Snapshot file, overrides config and environment
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not send a notification
    #[arg(long)]
    no_notify: bool,

    /// Trace level logging
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::DEBUG
    };
    let filter = filter::Targets::new().with_targets(vec![("macro_pulse", level), ("pulse", level)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    if let Err(e) = dotenv::dotenv() {
        debug!("no .env file loaded: {e}");
    }

    let mut config = Config::load(args.file.as_deref())?;
    if let Some(output) = args.output {
        config.snapshot_path = output;
    }
    if config.fred_api_key().is_none() {
        warn!("FRED API key not configured, yield falls back to market data and liquidity is unavailable");
    }

    let resolver = MetricResolver::from_config(&config)?;
    let store = JsonFileStore::new(&config.snapshot_path);
    let engine = DeltaEngine::new(ThresholdTable::with_overrides(&config.thresholds));
    let notifier = notify::from_config(&config)?;

    let outcome = Tick::new(&resolver, &store, &engine, notifier.as_ref())
        .notify_enabled(!args.no_notify)
        .run()
        .await;

    println!("{}", report::render(&outcome.readings));
    info!(
        "{}/{} metrics collected, notification {}",
        outcome.snapshot.summary.successful, outcome.snapshot.summary.total_metrics, outcome.notification
    );

    if outcome.persisted {
        info!("snapshot written to {}", config.snapshot_path.display());
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
