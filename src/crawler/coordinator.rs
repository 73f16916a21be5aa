//! Harvest coordinator - second pass and pipeline orchestration
//!
//! This module contains the sequential consumer that sits behind the
//! harvest channel:
//! - Deduplicating harvested hrefs
//! - Rate-limiting and fetching each unique href under the base domain
//! - Extracting the second set of links and combining them into the
//!   final result sequence
//!
//! It also wires both stages together into a [`Pipeline`].

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::harvest::{spawn_harvest, HarvestReport};
use crate::crawler::parser::LinkSelector;
use crate::crawler::rate_limit::{Limiter, RateLimiter};
use crate::{HarvestError, Result};
use reqwest::Client;
use std::collections::HashSet;
use tokio::sync::mpsc;

/// How second-pass results are combined into the final sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccumulationMode {
    /// Each unique href's results replace the previous ones; only the last
    /// processed href survives (including an empty result from a failure)
    #[default]
    Overwrite,
    /// Results of every unique href are appended in processing order
    Accumulate,
}

impl AccumulationMode {
    pub fn from_flag(accumulate: bool) -> Self {
        if accumulate {
            AccumulationMode::Accumulate
        } else {
            AccumulationMode::Overwrite
        }
    }
}

/// Counters and results of a finished second pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecondPassReport {
    /// The final result sequence
    pub results: Vec<String>,

    /// Values received from the harvest channel
    pub received: usize,

    /// Values seen for the first time (each one triggered a fetch)
    pub unique: usize,

    /// Values dropped as duplicates, without any I/O
    pub duplicates: usize,

    /// Second-pass fetches that failed
    pub fetch_failures: usize,

    /// Second-pass bodies that could not be parsed
    pub parse_failures: usize,
}

/// Result of visiting one unique href
enum Visit {
    Extracted(Vec<String>),
    FetchFailed,
    ParseFailed,
}

/// The sequential, deduplicating second pass
///
/// Owns its seen-set outright: there is exactly one consumer, so membership
/// test and insert need no locking.
pub struct SecondPass<L> {
    client: Client,
    base_domain: String,
    selector: LinkSelector,
    limiter: L,
    mode: AccumulationMode,
    seen: HashSet<String>,
}

impl<L: RateLimiter> SecondPass<L> {
    /// Creates a second pass
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `base_domain` - Prefix for harvested hrefs and extracted values
    /// * `selector` - Second-pass selector/attribute pair
    /// * `limiter` - Waited on before every fetch
    /// * `mode` - How results are combined
    pub fn new(
        client: Client,
        base_domain: impl Into<String>,
        selector: LinkSelector,
        limiter: L,
        mode: AccumulationMode,
    ) -> Self {
        Self {
            client,
            base_domain: base_domain.into(),
            selector,
            limiter,
            mode,
            seen: HashSet::new(),
        }
    }

    /// Consumes the channel until it closes
    ///
    /// Values are handled strictly one at a time in receive order. The rate
    /// limiter is charged once per unique value, never for duplicates.
    pub async fn run(mut self, mut rx: mpsc::Receiver<String>) -> SecondPassReport {
        let mut report = SecondPassReport::default();

        while let Some(href) = rx.recv().await {
            report.received += 1;

            if !self.seen.insert(href.clone()) {
                report.duplicates += 1;
                tracing::debug!("Skipping duplicate href {}", href);
                continue;
            }

            report.unique += 1;
            tracing::info!("Unique href: {}", href);

            self.limiter.until_ready().await;

            let extracted = match self.visit(&href).await {
                Visit::Extracted(values) => values,
                Visit::FetchFailed => {
                    report.fetch_failures += 1;
                    Vec::new()
                }
                Visit::ParseFailed => {
                    report.parse_failures += 1;
                    Vec::new()
                }
            };

            match self.mode {
                AccumulationMode::Overwrite => {
                    if !report.results.is_empty() {
                        tracing::debug!(
                            "Discarding {} earlier results, replaced by those of {}",
                            report.results.len(),
                            href
                        );
                    }
                    report.results = extracted;
                }
                AccumulationMode::Accumulate => report.results.extend(extracted),
            }
        }

        tracing::info!(
            "Second pass complete: {} received, {} unique, {} duplicates, {} results",
            report.received,
            report.unique,
            report.duplicates,
            report.results.len()
        );

        report
    }

    /// Fetches `base_domain + href` and extracts the prefixed values
    async fn visit(&self, href: &str) -> Visit {
        let url = format!("{}{}", self.base_domain, href);
        tracing::debug!("Second-pass fetch of {}", url);

        let Some(page) = fetch_page(&self.client, &url).await else {
            return Visit::FetchFailed;
        };

        match self.selector.extract_page(&page) {
            Ok(values) => Visit::Extracted(
                values
                    .into_iter()
                    .map(|value| format!("{}{}", self.base_domain, value))
                    .collect(),
            ),
            Err(e) => {
                tracing::warn!("Failed to parse HTML from {}: {}", url, e);
                Visit::ParseFailed
            }
        }
    }
}

/// Outcome of a full pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub harvest: HarvestReport,
    pub second_pass: SecondPassReport,
}

impl PipelineOutcome {
    /// The final result sequence
    pub fn results(&self) -> &[String] {
        &self.second_pass.results
    }

    pub fn into_results(self) -> Vec<String> {
        self.second_pass.results
    }
}

/// Both stages wired together: seeds in, final sequence out
pub struct Pipeline<L> {
    client: Client,
    first_pass: LinkSelector,
    second_pass: LinkSelector,
    base_domain: String,
    max_concurrent: Option<usize>,
    limiter: L,
    mode: AccumulationMode,
}

impl Pipeline<Limiter> {
    /// Builds a pipeline from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Pipeline)` - Client built and selectors compiled
    /// * `Err(HarvestError)` - HTTP client or selector setup failed
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client()?;
        let first_pass =
            LinkSelector::new(&config.first_pass.selector, &config.first_pass.attribute)?;
        let second_pass =
            LinkSelector::new(&config.second_pass.selector, &config.second_pass.attribute)?;
        let limiter =
            Limiter::from_config(config.second_pass.rate_limit, config.second_pass.delay_ms);

        Ok(Self {
            client,
            first_pass,
            second_pass,
            base_domain: config.second_pass.base_domain.clone(),
            max_concurrent: config
                .first_pass
                .max_concurrent_fetches
                .map(|limit| limit as usize),
            limiter,
            mode: AccumulationMode::from_flag(config.second_pass.accumulate),
        })
    }
}

impl<L: RateLimiter> Pipeline<L> {
    /// Replaces the rate limiter
    pub fn with_limiter<M: RateLimiter>(self, limiter: M) -> Pipeline<M> {
        Pipeline {
            client: self.client,
            first_pass: self.first_pass,
            second_pass: self.second_pass,
            base_domain: self.base_domain,
            max_concurrent: self.max_concurrent,
            limiter,
            mode: self.mode,
        }
    }

    /// The rate limiter used by the second pass
    pub fn limiter(&self) -> &L {
        &self.limiter
    }

    /// The accumulation mode used by the second pass
    pub fn mode(&self) -> AccumulationMode {
        self.mode
    }

    /// Runs both stages to completion
    ///
    /// Per-seed and per-href failures are absorbed and counted; only a
    /// failure of the harvest supervisor itself is returned as an error.
    pub async fn run(self, seeds: Vec<String>) -> Result<PipelineOutcome> {
        let (rx, supervisor) =
            spawn_harvest(self.client.clone(), self.first_pass, seeds, self.max_concurrent);

        let second_pass = SecondPass::new(
            self.client,
            self.base_domain,
            self.second_pass,
            self.limiter,
            self.mode,
        )
        .run(rx)
        .await;

        let harvest = supervisor
            .await
            .map_err(|e| HarvestError::Supervisor(e.to_string()))?;

        Ok(PipelineOutcome {
            harvest,
            second_pass,
        })
    }
}
