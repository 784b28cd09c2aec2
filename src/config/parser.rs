use crate::config::types::{Config, CrawlConfig};
use crate::config::validation::validate;
use crate::{ConfigError, SeedError};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads a configuration file and validates its `[spider]` table
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - Successfully loaded and validated crawl parameters
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use mini_spider::config::load_config;
///
/// let config = load_config(Path::new("conf/spider.toml")).unwrap();
/// println!("Max depth: {}", config.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<CrawlConfig, ConfigError> {
    let raw = read_config(path)?;
    validate(&raw.spider)
}

/// Reads and parses the configuration file without validating it
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is logged at startup so a run can be tied to the exact
/// configuration it was started with.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the validated config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(CrawlConfig, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Loads the seed URL list, a JSON array of URL strings
///
/// Seeds are returned in file order; duplicates are left in place since the
/// frontier schedules each URL only once anyway.
pub fn load_seeds(path: &Path) -> Result<Vec<String>, SeedError> {
    let file = std::fs::File::open(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
