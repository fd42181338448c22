//! JoinMetrics - merge metric files into one aggregate JSON document
//!
//! Reads the aggregate, joins one metric file or a whole folder of them
//! under `metrics.<name>`, and writes the aggregate back.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (missing file, malformed JSON, write error)

mod cli;
mod commands;
mod config;
mod error;
mod merge;
mod models;
mod scanner;
mod store;

use anyhow::{Context, Result};
use cli::{Args, Mode};
use commands::{JoinOptions, JoinTarget};
use config::Config;
use std::io;
use store::AggregateStore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("JoinMetrics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Join failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .joinmetrics.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", config::CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let store = AggregateStore::new(&config.paths.aggregate).with_pretty(config.merge.pretty);
    info!("Aggregate: {}", store.path().display());

    if args.list {
        return handle_list(&store);
    }

    let mode = match args.mode {
        Some(mode) => mode,
        None => cli::prompt_mode(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    let target = match mode {
        Mode::Single => {
            let file = match args.file {
                Some(ref file) => file.clone(),
                None => cli::prompt_file(&mut io::stdin().lock(), &mut io::stdout())?,
            };
            JoinTarget::Single { file }
        }
        Mode::Folder => JoinTarget::Folder {
            dir: config.paths.metrics_dir.clone(),
        },
    };

    let mut options = JoinOptions::from(&config);
    options.dry_run = args.dry_run;

    let summary = commands::dispatch(&target, &store, &options)
        .with_context(|| format!("Failed to join {}", describe(&target)))?;

    if summary.joined.is_empty() {
        warn!("No metric files joined");
    }
    debug!(
        "Joined {} metric(s) with {} save(s)",
        summary.joined.len(),
        summary.saves
    );

    Ok(())
}

/// Handle --list: print the metrics already in the aggregate.
fn handle_list(store: &AggregateStore) -> Result<()> {
    let summaries = commands::list_metrics(store)
        .with_context(|| format!("Failed to read {}", store.path().display()))?;

    if summaries.is_empty() {
        println!("No metrics joined yet.");
        return Ok(());
    }

    for summary in &summaries {
        println!("{} ({} entries)", summary.name, summary.entries);
    }
    println!("\nTotal: {} metrics", summaries.len());
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

fn describe(target: &JoinTarget) -> String {
    match target {
        JoinTarget::Single { file } => format!("metric file '{}'", file),
        JoinTarget::Folder { dir } => format!("metrics folder {}", dir.display()),
    }
}
