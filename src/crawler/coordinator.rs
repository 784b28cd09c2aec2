//! Crawl controller - seeding, worker startup and shutdown
//!
//! This module owns everything that lives for the whole crawl:
//! - The frontier shared by all workers
//! - The task tracker that joins workers, the seeding task and expansions
//! - The shutdown signal and the order in which resources are released
//! - Signal handling and the final statistics

use crate::config::{load_seeds, CrawlConfig};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::frontier::{Enqueued, Frontier, Task};
use crate::crawler::signals::{SignalEvent, SignalListener};
use crate::crawler::worker::{Worker, WorkerContext};
use crate::output::{CrawlStatistics, FilePageWriter, PageWriter, StopReason};
use crate::state::WorkerBoard;
use crate::SpiderError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Main crawler controller
pub struct Crawler {
    config: Arc<CrawlConfig>,
    seeds: Vec<String>,
    frontier: Arc<Frontier>,
    writer: Arc<dyn PageWriter>,
    board: Arc<WorkerBoard>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    started: AtomicBool,
    stopped: AtomicBool,
}

/// Requests shutdown of a running [`Crawler`] from elsewhere
#[derive(Debug, Clone)]
pub struct StopHandle {
    shutdown: CancellationToken,
}

impl StopHandle {
    /// Broadcasts the shutdown signal; calling it again does nothing
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Crawler {
    /// Creates a crawler that writes pages into the configured output directory
    pub fn new(config: CrawlConfig, seeds: Vec<String>) -> Self {
        let writer = Arc::new(FilePageWriter::new(config.output_directory.clone()));
        Self::with_writer(config, seeds, writer)
    }

    /// Creates a crawler with a custom page writer
    pub fn with_writer(
        config: CrawlConfig,
        seeds: Vec<String>,
        writer: Arc<dyn PageWriter>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let frontier = Arc::new(Frontier::new(config.thread_count, shutdown.clone()));

        Self {
            config: Arc::new(config),
            seeds,
            frontier,
            writer,
            board: Arc::new(WorkerBoard::new()),
            tracker: TaskTracker::new(),
            shutdown,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    /// Creates a crawler, loading the seed URLs from `urlListFile`
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to start
    /// * `Err(SpiderError::Seed)` - The seed file could not be read or parsed
    pub fn from_config(config: CrawlConfig) -> Result<Self, SpiderError> {
        let seeds = load_seeds(&config.url_list_file)?;
        tracing::info!(
            "loaded {} seed urls from {}",
            seeds.len(),
            config.url_list_file.display()
        );
        Ok(Self::new(config, seeds))
    }

    /// Seeds the frontier and launches `threadCount` workers
    ///
    /// Seeding runs concurrently with the workers. Calling `start` a second
    /// time does nothing.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Workers are running
    /// * `Err(SpiderError::Client)` - An HTTP client could not be built; nothing
    ///   was started
    pub fn start(&self) -> Result<(), SpiderError> {
        if self.started.swap(true, Ordering::AcqRel) {
            tracing::warn!("crawler already started");
            return Ok(());
        }

        let clients = (0..self.config.thread_count)
            .map(|_| build_http_client(self.config.crawl_timeout))
            .collect::<Result<Vec<_>, _>>()
            .map_err(SpiderError::Client)?;

        self.spawn_seeding();

        let ctx = WorkerContext {
            config: Arc::clone(&self.config),
            frontier: Arc::clone(&self.frontier),
            writer: Arc::clone(&self.writer),
            board: Arc::clone(&self.board),
            tracker: self.tracker.clone(),
            shutdown: self.shutdown.clone(),
        };

        for (id, client) in clients.into_iter().enumerate() {
            let worker = Worker::new(id, client, ctx.clone());
            self.tracker.spawn(worker.run());
        }

        tracing::info!(
            "crawler started: {} workers, maxDepth {}, interval {:?}, timeout {:?}",
            self.config.thread_count,
            self.config.max_depth,
            self.config.crawl_interval,
            self.config.crawl_timeout
        );
        Ok(())
    }

    fn spawn_seeding(&self) {
        // Keeps the frontier from looking idle before the first seed lands
        self.frontier.hold();

        let frontier = Arc::clone(&self.frontier);
        let seeds = self.seeds.clone();
        let depth = self.config.max_depth;

        self.tracker.spawn(async move {
            for url in seeds {
                match frontier.try_enqueue(Task::new(url.clone(), depth)).await {
                    Enqueued::Queued => tracing::info!("[{}] sent to taskQueue", url),
                    Enqueued::Duplicate => tracing::debug!("seed [{}] already scheduled", url),
                    Enqueued::Dropped => {
                        tracing::warn!("seeding interrupted by shutdown at [{}]", url);
                        break;
                    }
                }
            }
            frontier.task_done();
        });
    }

    /// Returns a handle that can stop this crawler from another task
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    /// Stops the crawl and releases the task queue
    ///
    /// The shutdown signal is broadcast, then every worker, the seeding task
    /// and every pending expansion are awaited. Only after all of them have
    /// exited is the queue released.
    ///
    /// Returns `false` if the crawler was already stopped.
    pub async fn stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            tracing::debug!("stop requested again, ignoring");
            return false;
        }

        tracing::info!("stopping crawler");
        self.shutdown.cancel();

        self.tracker.close();
        self.tracker.wait().await;

        let discarded = self.frontier.close().await;
        tracing::info!(
            "all workers exited, task queue released ({} queued tasks discarded)",
            discarded
        );
        true
    }

    /// Runs the crawl until a signal, a stop request or, with `stopWhenIdle`,
    /// until every scheduled task is processed
    ///
    /// SIGQUIT logs the worker board and keeps crawling.
    pub async fn run(self) -> Result<CrawlStatistics, SpiderError> {
        let started_at = Instant::now();
        let mut signals = SignalListener::new()?;

        self.start()?;

        let reason = loop {
            tokio::select! {
                event = signals.recv() => match event {
                    SignalEvent::Terminate => {
                        tracing::info!("termination signal received");
                        break StopReason::Signal;
                    }
                    SignalEvent::Dump => self.dump(),
                },
                _ = self.frontier.wait_idle(), if self.config.stop_when_idle => {
                    tracing::info!("every scheduled url has been processed");
                    break StopReason::Idle;
                }
                _ = self.shutdown.cancelled() => break StopReason::Requested,
            }
        };

        self.stop().await;

        Ok(CrawlStatistics::collect(
            &self.board,
            self.frontier.visited_count(),
            started_at.elapsed(),
            reason,
        ))
    }

    /// Logs the state of every worker and of the frontier
    pub fn dump(&self) {
        self.board.dump();
        tracing::info!(
            "frontier: {} urls scheduled, {} pending",
            self.frontier.visited_count(),
            self.frontier.pending()
        );
    }

    pub fn frontier(&self) -> Arc<Frontier> {
        Arc::clone(&self.frontier)
    }

    pub fn board(&self) -> Arc<WorkerBoard> {
        Arc::clone(&self.board)
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }
}
