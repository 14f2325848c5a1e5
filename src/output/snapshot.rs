//! Point-in-time dump of crawl state
//!
//! A snapshot is taken between visits from the engine's read-only views and
//! written to a directory as `state.json` plus `records.csv`. Nothing in this
//! crate reads a snapshot back.

use crate::output::records::write_records;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the JSON state inside a snapshot directory
pub const STATE_FILE: &str = "state.json";

/// File name of the records CSV inside a snapshot directory
pub const RECORDS_FILE: &str = "records.csv";

/// Frontier, visited set and record count at one moment
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSnapshot {
    pub taken_at: DateTime<Utc>,

    /// Hash of the configuration the crawl was started with
    pub config_hash: Option<String>,

    /// Pending addresses, high tier first
    pub frontier: Vec<String>,

    /// Visited addresses, sorted
    pub visited: Vec<String>,

    pub collected: usize,
}

impl CrawlSnapshot {
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }
}

/// Writes a snapshot and its records into `dir`, creating it if needed
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written `state.json`
/// * `Err(CrawlError)` - Failed to create the directory or write a file
pub fn write_snapshot<R: Serialize>(
    dir: &Path,
    snapshot: &CrawlSnapshot,
    records: &[R],
) -> Result<PathBuf, CrawlError> {
    fs::create_dir_all(dir)?;

    let state_path = dir.join(STATE_FILE);
    let file = fs::File::create(&state_path)?;
    serde_json::to_writer_pretty(file, snapshot)?;

    write_records(&dir.join(RECORDS_FILE), records)?;

    tracing::info!(
        "Snapshot written to {} ({} pending, {} visited, {} collected)",
        dir.display(),
        snapshot.frontier.len(),
        snapshot.visited.len(),
        snapshot.collected
    );

    Ok(state_path)
}
