//! Crawler module for the two-pass harvest
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching without retries
//! - Selector/attribute link extraction
//! - A bounded worker pool with a join barrier
//! - The concurrent first pass and the rate-limited second pass

mod coordinator;
mod decode;
mod fetcher;
mod harvest;
mod parser;
mod rate_limit;
mod scheduler;

pub use coordinator::{
    AccumulationMode, Pipeline, PipelineOutcome, SecondPass, SecondPassReport,
};
pub use decode::decode_markup;
pub use fetcher::{build_http_client, fetch_page, fetch_url, FetchResult, Page};
pub use harvest::{spawn_harvest, HarvestReport, SeedOutcome};
pub use parser::{extract, LinkSelector};
pub use rate_limit::{FixedDelay, Limiter, RateLimiter, TokenBucket, Unlimited};
pub use scheduler::{TaskId, TaskResult, WorkerPool};

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for a harvest. It will:
/// 1. Build the HTTP client, selectors and rate limiter from `config`
/// 2. Fetch every seed concurrently and extract first-pass links
/// 3. Deduplicate them and visit each unique link at the configured pace
/// 4. Return the final result sequence along with stage reports
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `seeds` - Seed URLs, in submission order
///
/// # Returns
///
/// * `Ok(PipelineOutcome)` - Harvest completed (individual pages may have failed)
/// * `Err(HarvestError)` - Setup failed
pub async fn harvest(config: &Config, seeds: Vec<String>) -> Result<PipelineOutcome, HarvestError> {
    let pipeline = Pipeline::from_config(config)?;
    tracing::info!(
        "Second pass rate limit: {}, results {:?}",
        pipeline.limiter().describe(),
        pipeline.mode()
    );
    pipeline.run(seeds).await
}
