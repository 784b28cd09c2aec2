//! Output module for persisting pages and reporting crawl results
//!
//! This module handles:
//! - Deriving file names from URLs
//! - Writing downloaded pages to the output directory
//! - Recording and printing crawl statistics

pub mod stats;
mod traits;
mod writer;

pub use stats::{print_statistics, CrawlStatistics, StopReason};
pub use traits::{PageWriter, WriteError, WriteResult};
pub use writer::{format_file_name, FilePageWriter};
