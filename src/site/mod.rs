//! Site-specific crawl policies
//!
//! A site policy implements [`crate::crawler::CrawlPolicy`] and owns all the
//! knowledge about one target: which addresses to follow, which to visit
//! first, and how to turn a page into a record.

mod product;

pub use product::{Product, ProductPolicy};
