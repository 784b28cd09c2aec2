use crate::config::types::{CrawlConfig, SpiderConfig};
use crate::ConfigError;
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_MAX_DEPTH: u32 = 0;
pub const DEFAULT_CRAWL_INTERVAL: u64 = 1;
pub const DEFAULT_CRAWL_TIMEOUT: u64 = 1;
pub const DEFAULT_THREAD_COUNT: usize = 8;

/// Validates the `[spider]` table and produces the read-only crawl parameters
///
/// Empty `urlListFile` or `targetUrl` and an uncompilable pattern are fatal.
/// Every other out-of-range value falls back to its default with a warning.
/// The output directory is created if it does not exist yet.
pub fn validate(spider: &SpiderConfig) -> Result<CrawlConfig, ConfigError> {
    if spider.url_list_file.trim().is_empty() {
        return Err(ConfigError::Validation(
            "urlListFile cannot be empty".to_string(),
        ));
    }

    if spider.target_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "targetUrl pattern cannot be empty".to_string(),
        ));
    }

    let output_directory = if spider.output_directory.trim().is_empty() {
        tracing::warn!(
            "found empty outputDirectory, set to default folder {}",
            DEFAULT_OUTPUT_DIR
        );
        PathBuf::from(DEFAULT_OUTPUT_DIR)
    } else {
        PathBuf::from(&spider.output_directory)
    };

    let max_depth = match u32::try_from(spider.max_depth) {
        Ok(depth) => depth,
        Err(_) if spider.max_depth < 0 => {
            tracing::warn!(
                "maxDepth should be >= 0, got {}, set to default value {}",
                spider.max_depth,
                DEFAULT_MAX_DEPTH
            );
            DEFAULT_MAX_DEPTH
        }
        Err(_) => {
            tracing::warn!(
                "maxDepth {} is too large, capped at {}",
                spider.max_depth,
                u32::MAX
            );
            u32::MAX
        }
    };

    let crawl_interval = seconds_or_default(
        "crawlInterval",
        spider.crawl_interval,
        DEFAULT_CRAWL_INTERVAL,
    );
    let crawl_timeout =
        seconds_or_default("crawlTimeout", spider.crawl_timeout, DEFAULT_CRAWL_TIMEOUT);

    let thread_count = match usize::try_from(spider.thread_count) {
        Ok(count) if count > 0 => count,
        _ => {
            tracing::warn!(
                "threadCount should be > 0, got {}, set to default value {}",
                spider.thread_count,
                DEFAULT_THREAD_COUNT
            );
            DEFAULT_THREAD_COUNT
        }
    };

    let target_pattern = Regex::new(&spider.target_url)?;

    std::fs::create_dir_all(&output_directory).map_err(|source| ConfigError::OutputDirectory {
        path: output_directory.clone(),
        source,
    })?;

    Ok(CrawlConfig {
        url_list_file: PathBuf::from(&spider.url_list_file),
        output_directory,
        max_depth,
        crawl_interval,
        crawl_timeout,
        target_pattern,
        thread_count,
        stop_when_idle: spider.stop_when_idle,
    })
}

/// Converts a signed seconds value, falling back to `default` when negative
fn seconds_or_default(name: &str, value: i64, default: u64) -> Duration {
    match u64::try_from(value) {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => {
            tracing::warn!(
                "{} should be >= 0, got {}, set to default value {}",
                name,
                value,
                default
            );
            Duration::from_secs(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spider_config(output: &TempDir) -> SpiderConfig {
        SpiderConfig {
            url_list_file: "./data/url.json".to_string(),
            output_directory: output.path().join("pages").display().to_string(),
            max_depth: 2,
            crawl_interval: 3,
            crawl_timeout: 5,
            target_url: r".*\.(htm|html)$".to_string(),
            thread_count: 4,
            stop_when_idle: false,
        }
    }

    #[test]
    fn test_valid_config_is_kept() {
        let output = TempDir::new().unwrap();
        let config = validate(&spider_config(&output)).unwrap();

        assert_eq!(config.max_depth, 2);
        assert_eq!(config.crawl_interval, Duration::from_secs(3));
        assert_eq!(config.crawl_timeout, Duration::from_secs(5));
        assert_eq!(config.thread_count, 4);
        assert!(config.target_pattern.is_match("http://example.com/index.html"));
        assert!(!config.target_pattern.is_match("http://example.com/logo.png"));
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let output = TempDir::new().unwrap();
        let mut spider = spider_config(&output);
        spider.max_depth = -1;
        spider.crawl_interval = -1;
        spider.crawl_timeout = -3;
        spider.thread_count = 0;

        let config = validate(&spider).unwrap();

        assert_eq!(config.max_depth, 0);
        assert_eq!(config.crawl_interval, Duration::from_secs(1));
        assert_eq!(config.crawl_timeout, Duration::from_secs(1));
        assert_eq!(config.thread_count, 8);
    }

    #[test]
    fn test_oversized_max_depth_is_capped() {
        let output = TempDir::new().unwrap();
        let mut spider = spider_config(&output);
        spider.max_depth = 5_000_000_000;

        let config = validate(&spider).unwrap();
        assert_eq!(config.max_depth, u32::MAX);
    }

    #[test]
    fn test_negative_thread_count_falls_back() {
        let output = TempDir::new().unwrap();
        let mut spider = spider_config(&output);
        spider.thread_count = -5;

        let config = validate(&spider).unwrap();
        assert_eq!(config.thread_count, DEFAULT_THREAD_COUNT);
    }

    #[test]
    fn test_zero_interval_is_allowed() {
        let output = TempDir::new().unwrap();
        let mut spider = spider_config(&output);
        spider.crawl_interval = 0;

        let config = validate(&spider).unwrap();
        assert_eq!(config.crawl_interval, Duration::ZERO);
    }

    #[test]
    fn test_empty_url_list_file_is_fatal() {
        let output = TempDir::new().unwrap();
        let mut spider = spider_config(&output);
        spider.url_list_file = "   ".to_string();

        assert!(matches!(validate(&spider), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_empty_target_url_is_fatal() {
        let output = TempDir::new().unwrap();
        let mut spider = spider_config(&output);
        spider.target_url = String::new();

        assert!(matches!(validate(&spider), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_bad_pattern_is_fatal() {
        let output = TempDir::new().unwrap();
        let mut spider = spider_config(&output);
        spider.target_url = "(unclosed".to_string();

        assert!(matches!(
            validate(&spider),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_output_directory_is_created() {
        let output = TempDir::new().unwrap();
        let spider = spider_config(&output);

        let config = validate(&spider).unwrap();
        assert!(config.output_directory.is_dir());
    }

    #[test]
    fn test_output_directory_creation_failure_is_fatal() {
        let output = TempDir::new().unwrap();
        let blocker = output.path().join("occupied");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut spider = spider_config(&output);
        spider.output_directory = blocker.join("pages").display().to_string();

        assert!(matches!(
            validate(&spider),
            Err(ConfigError::OutputDirectory { .. })
        ));
    }
}
