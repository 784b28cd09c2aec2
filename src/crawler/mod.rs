//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier: visited set plus bounded task queue
//! - HTTP fetching and per-worker rate limiting
//! - HTML link extraction
//! - The worker loop and the controller that starts and stops it

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod rate_limiter;
mod signals;
mod worker;

pub use coordinator::{Crawler, StopHandle};
pub use fetcher::{build_http_client, fetch_page, FetchedPage, USER_AGENT};
pub use frontier::{Enqueued, Frontier, Task};
pub use parser::extract_links;
pub use rate_limiter::RateLimiter;
pub use signals::{SignalEvent, SignalListener};
pub use worker::{Worker, WorkerContext};

use crate::config::CrawlConfig;
use crate::output::CrawlStatistics;
use crate::SpiderError;

/// Runs a complete crawl
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the seed URLs
/// 2. Start the workers and seed the frontier
/// 3. Crawl until a signal arrives (or the frontier drains with `stopWhenIdle`)
/// 4. Join every worker and release the task queue
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl finished
/// * `Err(SpiderError)` - Crawl could not start
pub async fn crawl(config: CrawlConfig) -> Result<CrawlStatistics, SpiderError> {
    Crawler::from_config(config)?.run().await
}
