//! Concurrent first-pass harvest
//!
//! One task is submitted per seed. Each task fetches its seed page,
//! extracts the configured attribute values and sends them, in document
//! order, on a channel shared by all tasks. A supervisor task waits for the
//! whole pool and then drops the last sender, which closes the channel and
//! tells the consumer that the harvest is over.

use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::LinkSelector;
use crate::crawler::scheduler::{TaskResult, WorkerPool};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How a single seed task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Page fetched and parsed; `sent` values went out on the channel
    Harvested { sent: usize },
    /// Transport error or non-200 status
    FetchFailed,
    /// Body could not be parsed as markup
    ParseFailed,
}

/// Counters describing a finished harvest stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Number of tasks submitted (one per seed)
    pub tasks_spawned: usize,

    /// Seeds whose page was fetched and parsed
    pub pages_harvested: usize,

    /// Seeds whose fetch failed
    pub fetch_failures: usize,

    /// Seeds whose body could not be parsed
    pub parse_failures: usize,

    /// Tasks that panicked
    pub panicked: usize,

    /// Total values sent on the channel
    pub values_sent: usize,
}

impl HarvestReport {
    fn record(&mut self, result: TaskResult<SeedOutcome>) {
        match result {
            TaskResult::Completed(SeedOutcome::Harvested { sent }) => {
                self.pages_harvested += 1;
                self.values_sent += sent;
            }
            TaskResult::Completed(SeedOutcome::FetchFailed) => self.fetch_failures += 1,
            TaskResult::Completed(SeedOutcome::ParseFailed) => self.parse_failures += 1,
            TaskResult::Panicked { .. } => self.panicked += 1,
        }
    }
}

/// Starts the harvest stage
///
/// Must be called from within a tokio runtime. Every task is spawned before
/// this function returns.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `selector` - First-pass selector/attribute pair
/// * `seeds` - Seed URLs, submitted in this order
/// * `max_concurrent` - Optional cap on simultaneous fetches
///
/// # Returns
///
/// The receiving end of the results channel and the supervisor handle,
/// which resolves to the stage report once the channel has been closed.
pub fn spawn_harvest(
    client: Client,
    selector: LinkSelector,
    seeds: Vec<String>,
    max_concurrent: Option<usize>,
) -> (mpsc::Receiver<String>, JoinHandle<HarvestReport>) {
    // Sized to the seed count; tokio rejects a zero capacity
    let (tx, rx) = mpsc::channel(seeds.len().max(1));
    let selector = Arc::new(selector);
    let mut pool = WorkerPool::new(max_concurrent);

    tracing::info!(
        "Starting harvest of {} seeds ({} @ {})",
        seeds.len(),
        selector.css(),
        selector.attribute()
    );

    for seed in seeds {
        pool.submit(harvest_seed(
            client.clone(),
            selector.clone(),
            seed,
            tx.clone(),
        ));
    }

    let supervisor = tokio::spawn(async move {
        let mut report = HarvestReport {
            tasks_spawned: pool.len(),
            ..HarvestReport::default()
        };

        for result in pool.join().await {
            report.record(result);
        }

        // Last sender: the channel closes here, exactly once
        drop(tx);

        tracing::info!(
            "Harvest complete: {} pages harvested, {} fetch failures, {} parse failures, {} values sent",
            report.pages_harvested,
            report.fetch_failures,
            report.parse_failures,
            report.values_sent
        );

        report
    });

    (rx, supervisor)
}

/// Fetches one seed page and forwards every extracted value
async fn harvest_seed(
    client: Client,
    selector: Arc<LinkSelector>,
    seed: String,
    tx: mpsc::Sender<String>,
) -> SeedOutcome {
    let Some(page) = fetch_page(&client, &seed).await else {
        return SeedOutcome::FetchFailed;
    };

    let links = match selector.extract_page(&page) {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("Failed to parse HTML from {}: {}", seed, e);
            return SeedOutcome::ParseFailed;
        }
    };

    let mut sent = 0;
    for href in links {
        tracing::debug!("Link: {}", href);
        if tx.send(href).await.is_err() {
            tracing::warn!("Result channel closed while harvesting {}", seed);
            break;
        }
        sent += 1;
    }

    SeedOutcome::Harvested { sent }
}
