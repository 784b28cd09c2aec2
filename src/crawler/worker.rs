//! Fetch-and-expand worker loop
//!
//! Each worker repeatedly takes a task from the frontier, fetches it, writes it
//! out when it matches the target pattern, and schedules the links it contains
//! while depth remains. All per-task failures are logged and swallowed here.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{fetch_page, FetchedPage};
use crate::crawler::frontier::{Enqueued, Frontier, Task};
use crate::crawler::parser::extract_links;
use crate::crawler::rate_limiter::RateLimiter;
use crate::output::{PageWriter, WriteError};
use crate::state::{WorkerBoard, WorkerState};
use reqwest::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Handles shared by every worker of one crawl
#[derive(Clone)]
pub struct WorkerContext {
    pub config: Arc<CrawlConfig>,
    pub frontier: Arc<Frontier>,
    pub writer: Arc<dyn PageWriter>,
    pub board: Arc<WorkerBoard>,
    /// Expansion tasks are spawned here so shutdown can join them
    pub tracker: TaskTracker,
    pub shutdown: CancellationToken,
}

/// One fetch-and-expand loop with its own HTTP client and rate limiter
pub struct Worker {
    id: usize,
    client: Client,
    limiter: RateLimiter,
    ctx: WorkerContext,
    last_url: Option<String>,
}

impl Worker {
    pub fn new(id: usize, client: Client, ctx: WorkerContext) -> Self {
        let limiter = RateLimiter::new(ctx.config.crawl_interval);
        ctx.board.register(id);

        Self {
            id,
            client,
            limiter,
            ctx,
            last_url: None,
        }
    }

    /// Runs until the frontier reports shutdown
    pub async fn run(mut self) {
        tracing::info!("[fetcher-{:03}] started", self.id);

        while let Some(task) = self.ctx.frontier.dequeue().await {
            tracing::debug!("[fetcher-{:03}] received url [{}]", self.id, task.url);
            self.last_url = Some(task.url.clone());

            match self.process(&task).await {
                Some(links) => self.spawn_expansion(task, links),
                None => self.ctx.frontier.task_done(),
            }

            self.return_to_idle();
        }

        self.set_state(WorkerState::Stopped, None);
        let downloaded = self
            .ctx
            .board
            .get(self.id)
            .map(|status| status.downloaded)
            .unwrap_or_default();

        tracing::info!(
            "[fetcher-{:03}] downloaded {} urls, last url [{}], quit",
            self.id,
            downloaded,
            self.last_url.as_deref().unwrap_or("-")
        );
    }

    /// Fetches one task and decides what to do with it
    ///
    /// Returns the child links when the task should be expanded, `None` when
    /// the task is finished (skipped, abandoned, or at depth 0).
    async fn process(&mut self, task: &Task) -> Option<Vec<String>> {
        let matched = self.ctx.config.target_pattern.is_match(&task.url);

        // A non-matching leaf has nothing to save and nothing to expand
        if !matched && task.depth == 0 {
            tracing::debug!("[fetcher-{:03}] skip dead end [{}]", self.id, task.url);
            return None;
        }

        self.set_state(WorkerState::Fetching, Some(&task.url));

        tokio::select! {
            biased;
            _ = self.ctx.shutdown.cancelled() => {
                tracing::debug!("[fetcher-{:03}] shutdown while waiting to fetch [{}]", self.id, task.url);
                return None;
            }
            _ = self.limiter.acquire() => {}
        }

        let page = match fetch_page(&self.client, &task.url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("[fetcher-{:03}] failed to fetch [{}], err: {}", self.id, task.url, e);
                return None;
            }
        };

        self.set_state(WorkerState::Deciding, None);
        if matched {
            self.save(&task.url, &page).await;
        }

        if task.depth == 0 {
            return None;
        }

        self.set_state(WorkerState::Expanding, None);
        match extract_links(&page.text(), page.final_url.as_str()) {
            Ok(links) => {
                tracing::info!(
                    "[fetcher-{:03}] {} links extracted from url [{}]",
                    self.id,
                    links.len(),
                    task.url
                );
                Some(links)
            }
            Err(message) => {
                let err = crate::SpiderError::Extract {
                    url: task.url.clone(),
                    message,
                };
                tracing::warn!("[fetcher-{:03}] {}", self.id, err);
                None
            }
        }
    }

    /// Hands the page to the writer; every failure is only a warning
    async fn save(&self, url: &str, page: &FetchedPage) {
        let writer = Arc::clone(&self.ctx.writer);
        let target = url.to_string();
        let body = page.body.clone();

        let result = tokio::task::spawn_blocking(move || writer.write(&target, &body)).await;

        match result {
            Ok(Ok(path)) => {
                let count = self.ctx.board.record_download(self.id);
                tracing::info!(
                    "[fetcher-{:03}] [{}] downloaded to {} ({} so far)",
                    self.id,
                    url,
                    path.display(),
                    count
                );
            }
            Ok(Err(e @ WriteError::AlreadyDownloaded(_))) => {
                tracing::warn!("[fetcher-{:03}] skip [{}]: {}", self.id, url, e);
            }
            Ok(Err(e)) => {
                let err = crate::SpiderError::from(e);
                tracing::warn!("[fetcher-{:03}] failed to download [{}], err: {}", self.id, url, err);
            }
            Err(e) => {
                tracing::warn!("[fetcher-{:03}] writer task for [{}] failed: {}", self.id, url, e);
            }
        }
    }

    /// Schedules the children of `parent` without blocking this worker
    ///
    /// The queue may be full while every worker is expanding, so children are
    /// submitted from a tracked task; the parent counts as pending until they
    /// are all handed over.
    fn spawn_expansion(&self, parent: Task, links: Vec<String>) {
        let frontier = Arc::clone(&self.ctx.frontier);
        let id = self.id;

        self.ctx.tracker.spawn(async move {
            expand(id, &frontier, &parent, links).await;
            frontier.task_done();
        });
    }

    fn set_state(&self, next: WorkerState, url: Option<&str>) {
        self.ctx.board.transition(self.id, next, url);
    }

    /// Moves back to `Idle` after a task; skipped tasks never left it
    fn return_to_idle(&self) -> bool {
        let busy = self
            .ctx
            .board
            .get(self.id)
            .is_some_and(|status| status.state.is_busy());

        busy && self.ctx.board.transition(self.id, WorkerState::Idle, None)
    }
}

/// Submits each link of `parent` as a child task
async fn expand(id: usize, frontier: &Frontier, parent: &Task, links: Vec<String>) {
    let mut queued = 0usize;

    for link in links {
        let Some(child) = parent.child(link) else {
            return;
        };

        match frontier.try_enqueue(child).await {
            Enqueued::Queued => queued += 1,
            Enqueued::Duplicate => {}
            Enqueued::Dropped => {
                tracing::warn!("[fetcher-{:03}] quit unexpectedly while sending urls", id);
                return;
            }
        }
    }

    tracing::debug!(
        "[fetcher-{:03}] queued {} new urls from [{}]",
        id,
        queued,
        parent.url
    );
}
