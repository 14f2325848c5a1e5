//! Two-tier frontier of addresses waiting to be visited
//!
//! The frontier keeps two flat, deduplicating sets:
//! - the high tier, drained first (pages the policy wants visited early)
//! - the low tier, drained only once the high tier is empty
//!
//! Deduplication is per tier only. An address inserted into both tiers is
//! held twice until popped; the crawl loop discards the second copy through
//! its visited set.

use crate::CrawlError;
use std::collections::HashSet;

/// Pending addresses, split into a high and a low priority tier
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    high: HashSet<String>,
    low: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds addresses to the high tier; addresses already there are ignored
    pub fn insert_high<I>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.high.extend(addresses);
    }

    /// Adds addresses to the low tier; addresses already there are ignored
    pub fn insert_low<I>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.low.extend(addresses);
    }

    /// Removes and returns the next address
    ///
    /// An address comes from the high tier whenever it is non-empty, otherwise
    /// from the low tier. Which address a tier hands out is unspecified.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The next address to visit
    /// * `Err(CrawlError::EmptyFrontier)` - Both tiers are empty
    pub fn pop(&mut self) -> Result<String, CrawlError> {
        let tier = if self.high.is_empty() {
            &mut self.low
        } else {
            &mut self.high
        };

        let next = tier.iter().next().cloned().ok_or(CrawlError::EmptyFrontier)?;
        tier.remove(&next);
        Ok(next)
    }

    /// Returns the number of pending addresses across both tiers
    pub fn len(&self) -> usize {
        self.high.len() + self.low.len()
    }

    /// Returns whether both tiers are empty
    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.low.is_empty()
    }

    /// Returns the number of addresses in the high tier
    pub fn high_len(&self) -> usize {
        self.high.len()
    }

    /// Returns the number of addresses in the low tier
    pub fn low_len(&self) -> usize {
        self.low.len()
    }

    /// Returns whether the address is pending in either tier
    pub fn contains(&self, address: &str) -> bool {
        self.high.contains(address) || self.low.contains(address)
    }

    /// Iterates over every pending address, high tier first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.high.iter().chain(self.low.iter()).map(String::as_str)
    }

    /// Copies every pending address out, high tier first (for snapshots)
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}
