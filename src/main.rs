//! ratiogen CLI entry point

use anyhow::{Context, Result};
use ratiogen::config::{cli::Cli, cli_convert, validator, Config};
use ratiogen::distribution::bucket::BucketSet;
use ratiogen::distribution::selector::Selector;
use ratiogen::output::{json, text};
use ratiogen::stats::aggregator::StatisticsAggregator;
use ratiogen::worker;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Number of upcoming bucket choices shown in dry-run mode
const PREVIEW_DRAWS: usize = 20;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    println!("ratiogen v{}", env!("CARGO_PKG_VERSION"));
    println!("Ratio-controlled random value generator");
    println!();

    cli.validate()?;

    let config = cli_convert::build_config(&cli)?;
    validator::validate_config(&config).context("Configuration validation failed")?;

    print!("{}", config);

    // Same set every worker builds on start, used for reporting
    let set = BucketSet::from_rows(&config.generator.buckets)
        .context("Invalid bucket configuration")?;

    if cli.dry_run {
        println!();
        print_preview(&set);
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    run(Arc::new(config), &set)
}

fn run(config: Arc<Config>, set: &BucketSet) -> Result<()> {
    println!();
    println!("Starting run...");
    println!();

    let start_time = chrono::Utc::now();
    let start = Instant::now();
    let results = worker::run_workers(Arc::clone(&config))?;
    let duration = start.elapsed();

    tracing::info!("{} workers finished in {:.3}s", results.len(), duration.as_secs_f64());

    let mut aggregator = StatisticsAggregator::new();
    for (id, stats) in results {
        aggregator.add_worker(id, stats);
    }

    text::print_results(set, &mut aggregator, duration, &config)?;

    if let Some(ref path) = config.output.json_output {
        let output = json::build_run_output(set, &mut aggregator, start_time, duration, &config)?;
        json::write_json_output(path, &output, !config.output.json_compact)?;
        println!("JSON report written to {}", path.display());
    }

    Ok(())
}

/// Show the bucket order a fresh context would follow
fn print_preview(set: &BucketSet) {
    let order: Vec<String> = Selector::preview(set, PREVIEW_DRAWS)
        .iter()
        .map(|row| row.to_string())
        .collect();

    println!("Selection preview (first {} rows chosen):", order.len());
    println!("  {}", order.join(" "));
}
