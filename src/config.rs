//! Process-wide configuration.
//!
//! Mirrors the teacher's pattern of environment-first configuration with
//! sane defaults (`DOCFLOW_DB_PATH` etc.), centralized so the watcher,
//! ingestion worker, and query pipeline all read from one place rather than
//! threading a dozen parameters through constructors.

use std::path::PathBuf;

/// Per-user upload quota, in number of files, unless the caller's role
/// grants wildcard access.
pub const DEFAULT_UPLOAD_QUOTA_FILES: u64 = 10;

/// Per-file upload size cap in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Seconds to wait after a file-created event before enqueueing ingestion,
/// so the watcher does not race a writer still appending to the file.
pub const DEFAULT_SETTLE_SECONDS: u64 = 2;

/// Seconds between prune sweeps of the vector store.
pub const DEFAULT_PRUNE_INTERVAL_SECONDS: u64 = 60;

/// Process-wide configuration, assembled once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path.
    pub db_path: PathBuf,
    /// Directory watched for incoming files.
    pub drop_dir: PathBuf,
    /// Root directory documents are moved into after classification.
    pub sorted_root: PathBuf,
    /// Whether to nest sorted files under a `YYYY-MM` directory.
    pub time_based_sorting: bool,
    /// Number of concurrent ingestion workers.
    pub worker_count: usize,
    /// Per-user upload quota in file count.
    pub upload_quota_files: u64,
    /// Per-file upload size cap in bytes.
    pub max_upload_bytes: u64,
    /// Settle delay before ingesting a newly created file.
    pub settle_seconds: u64,
    /// Interval between prune sweeps.
    pub prune_interval_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(crate::storage::DEFAULT_DB_PATH),
            drop_dir: PathBuf::from("./incoming"),
            sorted_root: PathBuf::from("./sorted"),
            time_based_sorting: false,
            worker_count: 2,
            upload_quota_files: DEFAULT_UPLOAD_QUOTA_FILES,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            settle_seconds: DEFAULT_SETTLE_SECONDS,
            prune_interval_seconds: DEFAULT_PRUNE_INTERVAL_SECONDS,
        }
    }
}

impl Config {
    /// Builds configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized variables: `DOCFLOW_DB_PATH`, `DOCFLOW_DROP_DIR`,
    /// `DOCFLOW_SORTED_ROOT`, `DOCFLOW_TIME_SORTING`, `DOCFLOW_WORKERS`,
    /// `DOCFLOW_UPLOAD_QUOTA`, `DOCFLOW_MAX_UPLOAD_BYTES`,
    /// `DOCFLOW_SETTLE_SECONDS`, `DOCFLOW_PRUNE_INTERVAL_SECONDS`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("DOCFLOW_DB_PATH") {
            config.db_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DOCFLOW_DROP_DIR") {
            config.drop_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DOCFLOW_SORTED_ROOT") {
            config.sorted_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DOCFLOW_TIME_SORTING") {
            config.time_based_sorting = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("DOCFLOW_WORKERS")
            && let Ok(n) = v.parse()
        {
            config.worker_count = n;
        }
        if let Ok(v) = std::env::var("DOCFLOW_UPLOAD_QUOTA")
            && let Ok(n) = v.parse()
        {
            config.upload_quota_files = n;
        }
        if let Ok(v) = std::env::var("DOCFLOW_MAX_UPLOAD_BYTES")
            && let Ok(n) = v.parse()
        {
            config.max_upload_bytes = n;
        }
        if let Ok(v) = std::env::var("DOCFLOW_SETTLE_SECONDS")
            && let Ok(n) = v.parse()
        {
            config.settle_seconds = n;
        }
        if let Ok(v) = std::env::var("DOCFLOW_PRUNE_INTERVAL_SECONDS")
            && let Ok(n) = v.parse()
        {
            config.prune_interval_seconds = n;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = Config::default();
        assert_eq!(config.upload_quota_files, DEFAULT_UPLOAD_QUOTA_FILES);
        assert!(config.worker_count > 0);
    }
}
