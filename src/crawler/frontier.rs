//! Crawl frontier: the visited set and the bounded task queue
//!
//! The frontier is the only shared crawl state. Workers, the seeding task and
//! expansion tasks touch it exclusively through [`Frontier::try_enqueue`],
//! [`Frontier::dequeue`] and [`Frontier::task_done`], so the "schedule each URL
//! at most once" invariant cannot be bypassed.

use dashmap::DashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{mpsc, Mutex, Notify};
use tokio_util::sync::CancellationToken;

/// A URL waiting to be fetched, with its remaining expansion budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// The URL to fetch
    pub url: String,

    /// Remaining link hops; 0 means fetch but do not expand
    pub depth: u32,
}

impl Task {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }

    /// Builds the task for a link found on this task's page
    ///
    /// Returns `None` when this task has no expansion budget left.
    pub fn child(&self, url: impl Into<String>) -> Option<Task> {
        self.depth.checked_sub(1).map(|depth| Task::new(url, depth))
    }
}

/// Outcome of [`Frontier::try_enqueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// The URL was new and its task is now in the queue
    Queued,
    /// The URL was scheduled before; nothing happened
    Duplicate,
    /// Shutdown was signaled (or the queue was released) before the task
    /// could be queued
    Dropped,
}

/// Shared visited set plus bounded FIFO task queue
pub struct Frontier {
    /// Every URL ever accepted for scheduling
    visited: DashSet<String>,

    sender: mpsc::Sender<Task>,

    /// `None` once the queue has been released
    receiver: Mutex<Option<mpsc::Receiver<Task>>>,

    shutdown: CancellationToken,

    /// Scheduled tasks not yet fully processed, plus outstanding holds
    pending: AtomicUsize,

    idle: Notify,

    closed: AtomicBool,

    /// Enqueue attempts made after the queue was released
    late_enqueues: AtomicUsize,
}

impl Frontier {
    /// Creates a frontier whose queue holds at most `capacity` tasks
    ///
    /// # Arguments
    ///
    /// * `capacity` - Queue capacity, normally the worker count (minimum 1)
    /// * `shutdown` - The crawl-wide shutdown signal
    pub fn new(capacity: usize, shutdown: CancellationToken) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        Self {
            visited: DashSet::new(),
            sender,
            receiver: Mutex::new(Some(receiver)),
            shutdown,
            pending: AtomicUsize::new(0),
            idle: Notify::new(),
            closed: AtomicBool::new(false),
            late_enqueues: AtomicUsize::new(0),
        }
    }

    /// Schedules `task` unless its URL was scheduled before
    ///
    /// The visited-set insertion decides the single winner among concurrent
    /// callers for the same URL; only the winner pushes onto the queue. When
    /// the queue is full the caller waits for room, unless shutdown is
    /// signaled, in which case the task is dropped.
    pub async fn try_enqueue(&self, task: Task) -> Enqueued {
        if self.closed.load(Ordering::Acquire) {
            self.late_enqueues.fetch_add(1, Ordering::Relaxed);
            tracing::error!("enqueue of [{}] after the task queue was released", task.url);
            return Enqueued::Dropped;
        }

        if self.shutdown.is_cancelled() {
            return Enqueued::Dropped;
        }

        if !self.visited.insert(task.url.clone()) {
            return Enqueued::Duplicate;
        }

        self.pending.fetch_add(1, Ordering::AcqRel);

        tokio::select! {
            biased;

            _ = self.shutdown.cancelled() => {
                tracing::debug!("dropping queued task, crawler is shutting down");
                self.task_done();
                Enqueued::Dropped
            }

            result = self.sender.send(task) => match result {
                Ok(()) => Enqueued::Queued,
                Err(mpsc::error::SendError(task)) => {
                    self.late_enqueues.fetch_add(1, Ordering::Relaxed);
                    tracing::error!("task queue released while enqueueing [{}]", task.url);
                    self.task_done();
                    Enqueued::Dropped
                }
            },
        }
    }

    /// Waits for the next task
    ///
    /// Returns `None` once shutdown is signaled or the queue was released,
    /// which tells the worker to leave its loop.
    pub async fn dequeue(&self) -> Option<Task> {
        let mut receiver = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return None,
            guard = self.receiver.lock() => guard,
        };

        let receiver = receiver.as_mut()?;

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            task = receiver.recv() => task,
        }
    }

    /// Registers work that is not a queued task but must finish before the
    /// frontier can be considered idle (e.g. seeding)
    pub fn hold(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    /// Marks one task (or hold) as fully processed, expansion included
    pub fn task_done(&self) {
        match self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => self.idle.notify_one(),
            Ok(_) => {}
            Err(_) => tracing::error!("task_done called with no pending work"),
        }
    }

    /// Resolves once no task is queued, in flight or being expanded
    ///
    /// Only meaningful after a [`hold`](Self::hold) was taken for the seeding
    /// step, otherwise an empty frontier is idle before it ever started.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Releases the task queue
    ///
    /// Must only be called after every producer and consumer has exited.
    /// Returns how many queued tasks were discarded.
    pub async fn close(&self) -> usize {
        self.closed.store(true, Ordering::Release);

        let Some(mut receiver) = self.receiver.lock().await.take() else {
            return 0;
        };

        receiver.close();
        let mut discarded = 0;
        while receiver.try_recv().is_ok() {
            discarded += 1;
        }
        discarded
    }

    /// Number of distinct URLs ever scheduled
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Scheduled tasks not yet fully processed
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Enqueue attempts that hit an already released queue
    pub fn late_enqueues(&self) -> usize {
        self.late_enqueues.load(Ordering::Relaxed)
    }
}
