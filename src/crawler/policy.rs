//! Crawl policy trait
//!
//! A policy decides which discovered addresses are worth visiting, which of
//! those jump the queue, and which visited pages produce a record. The engine
//! only enforces control flow; everything domain-specific lives behind this
//! trait.

use scraper::Html;

/// Domain-specific crawl behavior, injected into the engine at construction
pub trait CrawlPolicy {
    /// Structured value produced for a collected page
    type Record;

    /// Should a discovered address be queued at all?
    fn should_visit(&self, address: &str) -> bool;

    /// Should a queued address go to the high tier of the frontier?
    fn should_prioritize(&self, address: &str) -> bool;

    /// Should the visited page be handed to [`CrawlPolicy::collect`]?
    ///
    /// `status` is the final HTTP status of the fetch, `0` when no response
    /// was received.
    fn should_collect(&self, address: &str, status: u16) -> bool;

    /// Extracts a record from a visited page
    ///
    /// Only invoked when [`CrawlPolicy::should_collect`] returned true.
    /// Returning `None` declines to record anything, e.g. when the document
    /// is absent. Missing fields inside a present document belong in the
    /// record as absent values, never in a failure.
    fn collect(&self, address: &str, document: Option<&Html>, status: u16)
        -> Option<Self::Record>;
}
