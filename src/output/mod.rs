//! Output module for crawl results
//!
//! This module handles:
//! - Writing collected records to CSV
//! - Dumping frontier/visited/collected state as a snapshot
//! - Recording and printing crawl statistics

mod records;
mod snapshot;
pub mod stats;

pub use records::write_records;
pub use snapshot::{write_snapshot, CrawlSnapshot, RECORDS_FILE, STATE_FILE};
pub use stats::{print_statistics, CrawlStats};
