//! Run summary generation
//!
//! Collects timestamps and stage counters of a harvest run and prints them
//! to stdout in a readable block.

use crate::crawler::{HarvestReport, PipelineOutcome, SecondPassReport};
use chrono::{DateTime, Utc};

/// Summary of one harvest run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the results were saved
    pub finished_at: DateTime<Utc>,

    /// Hash of the configuration file used
    pub config_hash: String,

    /// First-pass counters
    pub harvest: HarvestReport,

    /// Second-pass counters (results not included)
    pub second_pass: SecondPassReport,

    /// Number of rows written to the sink
    pub results_written: usize,
}

impl RunSummary {
    /// Builds a summary from a finished pipeline
    ///
    /// The result sequence itself is not kept, only its length.
    pub fn new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        config_hash: impl Into<String>,
        outcome: &PipelineOutcome,
    ) -> Self {
        let second_pass = SecondPassReport {
            results: Vec::new(),
            ..outcome.second_pass.clone()
        };

        Self {
            started_at,
            finished_at,
            config_hash: config_hash.into(),
            harvest: outcome.harvest.clone(),
            second_pass,
            results_written: outcome.results().len(),
        }
    }

    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Percentage of seed pages that were fetched and parsed
    pub fn seed_success_rate(&self) -> f64 {
        if self.harvest.tasks_spawned == 0 {
            return 0.0;
        }
        (self.harvest.pages_harvested as f64 / self.harvest.tasks_spawned as f64) * 100.0
    }
}

/// Prints a run summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Run:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!("  Duration: {}s", summary.duration_seconds());
    println!("  Config hash: {}", summary.config_hash);
    println!();

    let harvest = &summary.harvest;
    println!("First Pass:");
    println!("  Seeds submitted: {}", harvest.tasks_spawned);
    println!(
        "  Pages harvested: {} ({:.1}%)",
        harvest.pages_harvested,
        summary.seed_success_rate()
    );
    println!("  Fetch failures: {}", harvest.fetch_failures);
    println!("  Parse failures: {}", harvest.parse_failures);
    if harvest.panicked > 0 {
        println!("  Panicked tasks: {}", harvest.panicked);
    }
    println!("  Links harvested: {}", harvest.values_sent);
    println!();

    let second = &summary.second_pass;
    println!("Second Pass:");
    println!("  Links received: {}", second.received);
    println!("  Unique links visited: {}", second.unique);
    println!("  Duplicates dropped: {}", second.duplicates);
    println!("  Fetch failures: {}", second.fetch_failures);
    println!("  Parse failures: {}", second.parse_failures);
    println!();

    println!("Results written: {}", summary.results_written);
}
