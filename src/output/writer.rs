//! Filesystem page writer
//!
//! Pages are stored one file per URL inside the output directory. The file
//! name is derived from the URL alone, so the same URL always maps to the
//! same file.

use crate::output::traits::{PageWriter, WriteError, WriteResult};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

const HTTPS_PREFIX: &str = "https://";
const HTTP_PREFIX: &str = "http://";

/// Derives the output file name for a URL
///
/// The scheme prefix is stripped, then `_` becomes `-` and `/` becomes `_`.
///
/// # Examples
///
/// ```
/// use mini_spider::output::format_file_name;
///
/// assert_eq!(format_file_name("http://www.baidu.com"), "www.baidu.com");
/// assert_eq!(format_file_name("https://cloud.baidu.com/BFE"), "cloud.baidu.com_BFE");
/// ```
pub fn format_file_name(url: &str) -> String {
    let stripped = url
        .strip_prefix(HTTPS_PREFIX)
        .or_else(|| url.strip_prefix(HTTP_PREFIX))
        .unwrap_or(url);

    stripped.replace('_', "-").replace('/', "_")
}

/// Writes pages into a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FilePageWriter {
    output_dir: PathBuf,
}

impl FilePageWriter {
    /// Creates a writer for an existing output directory
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Full path a URL would be written to
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.output_dir.join(format_file_name(url))
    }
}

impl PageWriter for FilePageWriter {
    fn write(&self, url: &str, body: &[u8]) -> WriteResult<PathBuf> {
        let path = self.path_for(url);

        // create_new makes the existence check and the creation a single step
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(WriteError::AlreadyDownloaded(path));
            }
            Err(source) => return Err(WriteError::Io { path, source }),
        };

        file.write_all(body)
            .and_then(|_| file.flush())
            .map_err(|source| WriteError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}
