//! Mini-Spider: a bounded-depth, single-target web crawler
//!
//! This crate crawls outward from a list of seed URLs, breadth-first up to a
//! configured depth, and downloads every page whose URL matches a target pattern.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Mini-Spider operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed list error: {0}")]
    Seed(#[from] SeedError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Link extraction failed for {url}: {message}")]
    Extract { url: String, message: String },

    #[error("Write error: {0}")]
    Write(#[from] output::WriteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to compile targetUrl pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Seed list errors
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read urlListFile {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load urlListFile {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type alias for Mini-Spider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlConfig};
pub use crawler::{Crawler, Frontier, Task};
pub use state::WorkerState;
