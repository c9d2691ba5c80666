//! Human-readable text output

use crate::config::Config;
use crate::distribution::bucket::BucketSet;
use crate::stats::aggregator::StatisticsAggregator;
use crate::stats::report::DistributionReport;
use crate::stats::WorkerStats;
use crate::util::time::{calculate_rate, format_duration, format_number, format_rate};
use crate::Result;
use std::fmt::Write;
use std::time::Duration;

/// Print run results to console
///
/// Displays:
/// - Elapsed time and draw rate
/// - Observed vs target share per bucket
/// - Range of produced values
/// - Per-worker breakdown (if enabled)
pub fn print_results(
    set: &BucketSet,
    aggregator: &mut StatisticsAggregator,
    duration: Duration,
    config: &Config,
) -> Result<()> {
    let aggregate = aggregator.aggregate()?.clone();

    println!("═══════════════════════════════════════════════════════════");
    println!("                    RUN RESULTS");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    println!("Elapsed Time: {} ({:.3}s)", format_duration(duration), duration.as_secs_f64());
    println!(
        "Draws:        {} ({} /s) across {} workers",
        format_number(aggregate.iterations()),
        format_rate(calculate_rate(aggregate.iterations(), duration)),
        aggregator.num_workers()
    );
    println!();

    println!("Distribution ({}):", config.generator.variable_name);
    print!("{}", format_distribution(&DistributionReport::new(set, &aggregate)));
    println!();

    print_values(&aggregate);

    if config.output.show_per_worker {
        println!("Per Worker:");
        for id in aggregator.worker_ids() {
            if let Some(stats) = aggregator.worker_stats(id) {
                let report = DistributionReport::new(set, stats);
                println!(
                    "  Worker {}: {} draws, max deviation {:+.4}",
                    id,
                    format_number(stats.iterations()),
                    report.max_abs_deviation()
                );
                for bucket in &report.buckets {
                    println!(
                        "    row {}: {:>8.4} (target {:.4})",
                        bucket.row, bucket.observed_share, bucket.expected_share
                    );
                }
            }
        }
        println!();
    }

    println!("═══════════════════════════════════════════════════════════");
    Ok(())
}

/// Render the per-bucket table of a distribution report
pub fn format_distribution(report: &DistributionReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "  {:>4}  {:>23}  {:>8}  {:>8}  {:>12}  {:>8}  {:>9}",
        "Row", "Range", "Ratio", "Target", "Count", "Observed", "Deviation"
    );
    for bucket in &report.buckets {
        let _ = writeln!(
            out,
            "  {:>4}  {:>23}  {:>8}  {:>7.2}%  {:>12}  {:>7.2}%  {:>+8.2}%",
            bucket.row,
            format!("[{}, {}]", bucket.min, bucket.max),
            bucket.ratio,
            bucket.expected_share * 100.0,
            format_number(bucket.observed_count),
            bucket.observed_share * 100.0,
            bucket.deviation * 100.0
        );
    }
    if report.unclassified > 0 {
        let _ = writeln!(
            out,
            "  Unclassified: {} (exported text outside every range)",
            format_number(report.unclassified)
        );
    }

    out
}

fn print_values(stats: &WorkerStats) {
    println!("Values:");
    match (stats.min_value(), stats.mean_value(), stats.max_value()) {
        (Some(min), Some(mean), Some(max)) => {
            println!("  Min:  {}", min);
            println!("  Mean: {:.4}", mean);
            println!("  Max:  {}", max);
        }
        _ => println!("  No values produced"),
    }
    println!();
}
