use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Raw configuration file structure for Mini-Spider
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub spider: SpiderConfig,
}

/// The `[spider]` table, exactly as written in the configuration file
///
/// Numeric fields are signed so that out-of-range values reach validation,
/// where they fall back to their defaults with a warning.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpiderConfig {
    /// Path to the JSON file holding the seed URL list
    #[serde(default)]
    pub url_list_file: String,

    /// Directory that downloaded pages are written to
    #[serde(default)]
    pub output_directory: String,

    /// Maximum number of link hops followed from a seed
    #[serde(default)]
    pub max_depth: i64,

    /// Minimum seconds between two fetches of the same worker
    #[serde(default)]
    pub crawl_interval: i64,

    /// Request timeout in seconds
    #[serde(default)]
    pub crawl_timeout: i64,

    /// Regular expression selecting the pages to download
    #[serde(default)]
    pub target_url: String,

    /// Number of concurrent workers
    #[serde(default)]
    pub thread_count: i64,

    /// Stop on its own once every scheduled task has been processed
    #[serde(default)]
    pub stop_when_idle: bool,
}

/// Validated, read-only crawl parameters
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub url_list_file: PathBuf,
    pub output_directory: PathBuf,
    pub max_depth: u32,
    pub crawl_interval: Duration,
    pub crawl_timeout: Duration,
    pub target_pattern: Regex,
    pub thread_count: usize,
    pub stop_when_idle: bool,
}
