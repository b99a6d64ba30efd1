//! BarSignal CLI: run the signal pipeline and inspect its log.
//!
//! Commands:
//! - `run`: ingest bars, fit the model, rewrite the signal log
//! - `status`: gate the latest logged signal and summarize the log
//! - `watch`: `run` then `status` on a fixed interval

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use barsignal_core::{GateStatus, Label};
use barsignal_runner::{LogCache, LogSummary, Pipeline, PipelineConfig, RunReport};

#[derive(Parser)]
#[command(
    name = "barsignal",
    about = "BarSignal CLI: intraday bar signals with a trade gate"
)]
struct Cli {
    /// Log filter (e.g. info, barsignal_runner=debug). Falls back to RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and rewrite the signal log.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Bar CSV (overrides the config).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Signal log path (overrides the config).
        #[arg(long)]
        log: Option<PathBuf>,

        /// Print the run report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Gate the latest logged signal and summarize the log.
    Status {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Signal log path (overrides the config).
        #[arg(long)]
        log: Option<PathBuf>,

        /// Print the summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Re-run the pipeline periodically and print status after each run.
    Watch {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seconds between runs.
        #[arg(long, default_value_t = 60)]
        interval: u64,

        /// Stop after this many runs (at least 1). Runs until interrupted when omitted.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        iterations: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Run {
            config,
            input,
            log,
            json,
        } => {
            let config = load_config(config.as_deref(), input, log)?;
            run_once(config, json)
        }
        Commands::Status { config, log, json } => {
            let config = load_config(config.as_deref(), None, log)?;
            let mut cache = LogCache::new(config.cache_ttl());
            run_status(&config, &mut cache, json)
        }
        Commands::Watch {
            config,
            interval,
            iterations,
        } => {
            let config = load_config(config.as_deref(), None, None)?;
            run_watch(config, interval, iterations)
        }
    }
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("bad --log-level '{level}'"))?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_config(
    path: Option<&Path>,
    input: Option<PathBuf>,
    log: Option<PathBuf>,
) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(input) = input {
        config.input_path = input;
    }
    if let Some(log) = log {
        config.log_path = log;
    }
    Ok(config)
}

fn run_once(config: PipelineConfig, json: bool) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let report = pipeline.run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        println!("Log written to: {}", pipeline.config().log_path.display());
    }
    Ok(())
}

fn run_status(config: &PipelineConfig, cache: &mut LogCache, json: bool) -> Result<()> {
    let rows = cache
        .get(&config.log_path)
        .with_context(|| format!("reading signal log {}", config.log_path.display()))?;
    let summary = LogSummary::from_rows(rows, &config.gate(), Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_status(&summary, config);
    }
    Ok(())
}

fn run_watch(config: PipelineConfig, interval: u64, iterations: Option<u64>) -> Result<()> {
    if interval == 0 {
        bail!("--interval must be at least 1 second");
    }
    let pipeline = Pipeline::new(config)?;
    let mut cache = LogCache::new(pipeline.config().cache_ttl());

    let mut done = 0u64;
    loop {
        done += 1;
        println!("== run {done} at {} ==", Utc::now().format("%Y-%m-%d %H:%M:%S"));

        // A failed run leaves the previous log in place; status still reports it.
        match pipeline.run() {
            Ok(report) => print_report(&report),
            Err(e) => eprintln!("Run failed: {e}"),
        }
        if let Err(e) = run_status(pipeline.config(), &mut cache, false) {
            eprintln!("Status unavailable: {e:#}");
        }

        if iterations.is_some_and(|n| done >= n) {
            break;
        }
        std::thread::sleep(Duration::from_secs(interval));
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Bars read:      {}", report.bars_in);
    if report.bars_skipped > 0 {
        println!("Bars skipped:   {}", report.bars_skipped);
    }
    println!("Rows retained:  {}", report.rows_retained);
    println!(
        "Labels:         BUY {}  SELL {}  HOLD {}",
        report.label_counts.buy, report.label_counts.sell, report.label_counts.hold
    );
    println!(
        "Predictions:    BUY {}  SELL {}  HOLD {}",
        report.prediction_counts.buy,
        report.prediction_counts.sell,
        report.prediction_counts.hold
    );
    let eval = &report.evaluation;
    match eval.accuracy {
        Some(acc) => println!(
            "Held-out:       {}/{} correct ({:.1}%), trained on {}",
            eval.correct,
            eval.n_test,
            acc * 100.0,
            eval.n_train
        ),
        None => println!("Held-out:       none, trained on {}", eval.n_train),
    }
    if let Some(hash) = &report.dataset_hash {
        println!("Dataset:        {}", &hash[..16.min(hash.len())]);
    }
    if let Some(last) = report.log_rows.last() {
        println!(
            "Latest:         {} {} {:.2}% @ {:.2}",
            last.timestamp.format("%Y-%m-%d %H:%M:%S"),
            last.signal,
            last.confidence,
            last.price
        );
    }
}

fn print_status(summary: &LogSummary, config: &PipelineConfig) {
    let (Some(latest), Some(decision)) = (&summary.latest, &summary.decision) else {
        println!("Signal log is empty: {}", config.log_path.display());
        return;
    };

    println!(
        "Latest signal:  {} {:.2}% @ {:.2} ({})",
        latest.signal,
        latest.confidence,
        latest.price,
        latest.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "Time window:    {} (trading ends {:02}:00 UTC)",
        yes_no(decision.valid_time),
        config.trading_end_hour
    );
    println!(
        "Confidence:     {} (min {:.0}%)",
        yes_no(decision.confident),
        config.min_confidence
    );
    let marker = match decision.status {
        GateStatus::Valid => "✅",
        GateStatus::Blocked => "⛔",
    };
    println!("Trade status:   {marker} {}", decision.status);

    println!();
    println!(
        "{:<20} {:<6} {:>10} {:>12}",
        "Timestamp", "Signal", "Confidence", "Price"
    );
    println!("{}", "-".repeat(51));
    for row in &summary.recent {
        println!(
            "{:<20} {:<6} {:>10.2} {:>12.2}",
            row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            row.signal.as_str(),
            row.confidence,
            row.price
        );
    }

    println!();
    println!("Confidence distribution:");
    for (i, count) in summary.confidence_histogram.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        println!("  {:>3}-{:<3} {}", i * 10, i * 10 + 10, "#".repeat(*count));
    }

    let counts = &summary.label_counts;
    println!();
    for label in Label::ALL {
        println!("  {:<5} {}", label.as_str(), counts.get(label));
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
