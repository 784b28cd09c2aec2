use crate::state::WorkerState;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Snapshot of a single worker's progress
#[derive(Debug, Clone)]
pub struct WorkerStatus {
    /// Worker id, `0..threadCount`
    pub id: usize,

    /// Current state of the worker loop
    pub state: WorkerState,

    /// URL of the task being processed, if any
    pub current_url: Option<String>,

    /// Pages this worker has written successfully
    pub downloaded: u64,

    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}

impl WorkerStatus {
    fn new(id: usize) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            current_url: None,
            downloaded: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Diagnostic board where every worker publishes its status
///
/// Each worker only ever writes its own entry. The board is read for the
/// diagnostic dump and for the final statistics, never for crawl decisions.
#[derive(Debug, Default)]
pub struct WorkerBoard {
    workers: DashMap<usize, WorkerStatus>,
}

impl WorkerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an idle entry for a worker about to start
    pub fn register(&self, id: usize) {
        self.workers.insert(id, WorkerStatus::new(id));
    }

    /// Moves a worker to `next`, recording the URL it is working on
    ///
    /// Illegal moves are rejected and leave the entry untouched.
    pub fn transition(&self, id: usize, next: WorkerState, url: Option<&str>) -> bool {
        let Some(mut status) = self.workers.get_mut(&id) else {
            tracing::debug!("transition for unknown worker {}", id);
            return false;
        };

        if !status.state.can_transition_to(next) {
            tracing::debug!(
                "[fetcher-{:03}] rejected state change {} -> {}",
                id,
                status.state,
                next
            );
            return false;
        }

        status.state = next;
        if let Some(url) = url {
            status.current_url = Some(url.to_string());
        } else if next == WorkerState::Idle {
            status.current_url = None;
        }
        status.updated_at = Utc::now();
        true
    }

    /// Increments a worker's completed-download counter, returning the new count
    pub fn record_download(&self, id: usize) -> u64 {
        match self.workers.get_mut(&id) {
            Some(mut status) => {
                status.downloaded += 1;
                status.downloaded
            }
            None => 0,
        }
    }

    /// Returns a copy of one worker's status
    pub fn get(&self, id: usize) -> Option<WorkerStatus> {
        self.workers.get(&id).map(|entry| entry.value().clone())
    }

    /// Returns all worker statuses ordered by id
    pub fn snapshot(&self) -> Vec<WorkerStatus> {
        let mut statuses: Vec<WorkerStatus> =
            self.workers.iter().map(|entry| entry.value().clone()).collect();
        statuses.sort_by_key(|status| status.id);
        statuses
    }

    /// Returns true once every registered worker has stopped
    pub fn all_stopped(&self) -> bool {
        self.workers
            .iter()
            .all(|entry| entry.value().state.is_terminal())
    }

    /// Total pages written across all workers
    pub fn total_downloaded(&self) -> u64 {
        self.workers.iter().map(|entry| entry.value().downloaded).sum()
    }

    /// Logs every worker's state without disturbing the crawl
    pub fn dump(&self) {
        let statuses = self.snapshot();
        tracing::info!("==== worker dump: {} workers ====", statuses.len());
        for status in statuses {
            tracing::info!(
                "[fetcher-{:03}] state={} url={} downloaded={} since={}",
                status.id,
                status.state,
                status.current_url.as_deref().unwrap_or("-"),
                status.downloaded,
                status.updated_at.to_rfc3339()
            );
        }
        tracing::info!("==== end of worker dump ====");
    }
}
