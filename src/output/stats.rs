//! Statistics for a crawl run
//!
//! This module provides the counters the engine keeps while crawling and a
//! formatted report of them.

use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Number of distinct addresses handed to the fetcher
    pub visited: usize,

    /// Number of addresses still waiting in the frontier
    pub pending: usize,

    /// Number of records collected
    pub collected: usize,

    /// Popped addresses discarded because they had already been visited
    pub duplicates_skipped: usize,

    /// Count of visits by final HTTP status (0 = no response)
    pub visits_by_status: BTreeMap<u16, usize>,
}

impl CrawlStats {
    /// Number of visits that ended with a 2xx status
    pub fn successful(&self) -> usize {
        self.visits_by_status
            .iter()
            .filter(|(status, _)| (200..300).contains(*status))
            .map(|(_, count)| count)
            .sum()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.visited == 0 {
            return 0.0;
        }
        (self.successful() as f64 / self.visited as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  visited: {} pages", stats.visited);
    println!("  frontier: {} pages", stats.pending);
    println!("  collected: {} records", stats.collected);
    println!("  duplicates skipped: {}", stats.duplicates_skipped);
    println!();

    if !stats.visits_by_status.is_empty() {
        println!("Visits by Status:");
        for (status, count) in &stats.visits_by_status {
            let label = if *status == 0 {
                "no response".to_string()
            } else {
                status.to_string()
            };
            println!("  {}: {}", label, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched successfully)",
        stats.success_rate(),
        stats.successful(),
        stats.visited
    );
}
