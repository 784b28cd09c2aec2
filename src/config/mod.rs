//! Configuration module for Mini-Spider
//!
//! This module loads the TOML configuration file, validates it into a
//! read-only [`CrawlConfig`], and loads the JSON seed URL list.
//!
//! # Example
//!
//! ```no_run
//! use mini_spider::config::{load_config, load_seeds};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("conf/spider.toml")).unwrap();
//! let seeds = load_seeds(&config.url_list_file).unwrap();
//! println!("{} seeds, max depth {}", seeds.len(), config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlConfig, SpiderConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, load_seeds, read_config};
pub use validation::{
    validate, DEFAULT_CRAWL_INTERVAL, DEFAULT_CRAWL_TIMEOUT, DEFAULT_MAX_DEPTH,
    DEFAULT_OUTPUT_DIR, DEFAULT_THREAD_COUNT,
};
