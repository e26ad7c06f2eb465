//! Typed configuration passed explicitly into the core.
//!
//! # Responsibility
//! - Hold connection, deadline and paging defaults in one deserializable
//!   shape the host can load from any serde source.
//!
//! # Invariants
//! - Every field has a default; an empty document is a valid config.
//! - Nothing here is global; callers hand a `StoreConfig` to
//!   `db::open_db_with_config` and `SqliteExecutor::new`.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Reference per-operation deadline.
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Store and list-engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Deadline applied to every list/get/mutate statement.
    pub query_timeout_ms: u64,
    /// SQLite busy handler timeout for lock contention.
    pub busy_timeout_ms: u64,
    /// Page size used when a list request names none.
    pub default_page_size: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            default_page_size: crate::query::DEFAULT_PAGE_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Logger backend settings, consumed by `logging::init_logging`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level_owned")]
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl LogConfig {
    pub fn new(level: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: level.into(),
            log_dir: log_dir.into(),
        }
    }
}

/// Returns the default log level for current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `info`
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn default_log_level_owned() -> String {
    default_log_level().to_string()
}
