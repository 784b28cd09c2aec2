/// Worker state definitions for the fetch-and-expand loop
///
/// This module defines every state a worker can be in and which moves between
/// them are legal.
use std::fmt;

/// Represents the current state of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Waiting on the frontier for the next task
    Idle,

    /// Waiting on the rate limiter or the HTTP response
    Fetching,

    /// Deciding whether to persist the fetched page
    Deciding,

    /// Extracting links and handing child tasks to the frontier
    Expanding,

    /// The worker loop has exited
    Stopped,
}

impl WorkerState {
    /// Returns true if the worker has exited its loop
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true if the worker currently holds a task
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Fetching | Self::Deciding | Self::Expanding)
    }

    /// Returns whether moving from `self` to `next` is legal
    ///
    /// The regular cycle is `Idle → Fetching → Deciding → Expanding → Idle`.
    /// A skipped or abandoned task goes straight back to `Idle` from
    /// `Fetching` or `Deciding`, and any live state may move to `Stopped`.
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        use WorkerState::*;

        match (self, next) {
            (Stopped, _) => false,
            (_, Stopped) => true,
            (Idle, Fetching) => true,
            (Fetching, Deciding) | (Fetching, Idle) => true,
            (Deciding, Expanding) | (Deciding, Idle) => true,
            (Expanding, Idle) => true,
            _ => false,
        }
    }

    /// Short lowercase label used in logs and diagnostic dumps
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Deciding => "deciding",
            Self::Expanding => "expanding",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
