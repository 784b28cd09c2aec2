//! State module for tracking worker progress
//!
//! This module provides the worker state machine and the diagnostic board the
//! workers publish their status to.
//!
//! # Components
//!
//! - `WorkerState`: The fetch-and-expand state machine (idle, fetching, deciding, expanding, stopped)
//! - `WorkerBoard`: Per-worker status used for diagnostic dumps and final statistics

mod worker_board;
mod worker_state;

// Re-export main types
pub use worker_board::{WorkerBoard, WorkerStatus};
pub use worker_state::WorkerState;
