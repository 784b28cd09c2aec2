//! Statistics for a finished crawl
//!
//! This module collects the final numbers from the worker board and the
//! frontier and prints them once the crawler has shut down.

use crate::state::WorkerBoard;
use std::fmt;
use std::time::Duration;

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// An interrupt or terminate signal arrived
    Signal,
    /// `stop()` was called directly
    Requested,
    /// Every scheduled task was processed and `stopWhenIdle` is set
    Idle,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal => f.write_str("signal"),
            Self::Requested => f.write_str("stop request"),
            Self::Idle => f.write_str("frontier exhausted"),
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Pages written, per worker id
    pub downloads_by_worker: Vec<(usize, u64)>,

    /// Pages written by all workers
    pub total_downloaded: u64,

    /// Distinct URLs ever scheduled
    pub urls_scheduled: usize,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,

    /// What ended the crawl
    pub stop_reason: StopReason,
}

impl CrawlStatistics {
    /// Builds the statistics from the final worker board
    pub fn collect(
        board: &WorkerBoard,
        urls_scheduled: usize,
        elapsed: Duration,
        stop_reason: StopReason,
    ) -> Self {
        let downloads_by_worker = board
            .snapshot()
            .into_iter()
            .map(|status| (status.id, status.downloaded))
            .collect();

        Self {
            downloads_by_worker,
            total_downloaded: board.total_downloaded(),
            urls_scheduled,
            elapsed,
            stop_reason,
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Stopped by: {}", stats.stop_reason);
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!("  URLs scheduled: {}", stats.urls_scheduled);
    println!("  Pages downloaded: {}", stats.total_downloaded);
    println!();

    println!("Downloads by Worker:");
    for (id, count) in &stats.downloads_by_worker {
        println!("  fetcher-{:03}: {}", id, count);
    }
    println!();

    let rate = if stats.elapsed.as_secs_f64() > 0.0 {
        stats.total_downloaded as f64 / stats.elapsed.as_secs_f64()
    } else {
        0.0
    };
    println!("Download Rate: {:.2} pages/sec", rate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::WorkerState;

    #[test]
    fn test_collect_from_board() {
        let board = WorkerBoard::new();
        board.register(1);
        board.register(0);
        board.record_download(1);
        board.record_download(1);
        board.transition(0, WorkerState::Stopped, None);

        let stats =
            CrawlStatistics::collect(&board, 5, Duration::from_secs(2), StopReason::Idle);

        assert_eq!(stats.downloads_by_worker, vec![(0, 0), (1, 2)]);
        assert_eq!(stats.total_downloaded, 2);
        assert_eq!(stats.urls_scheduled, 5);
        assert_eq!(stats.stop_reason.to_string(), "frontier exhausted");
    }
}
