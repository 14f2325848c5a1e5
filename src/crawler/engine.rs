//! Crawl engine - the main traversal loop
//!
//! The engine owns the frontier, the visited set and the collected records.
//! It repeatedly pops an address, fetches it, feeds the links the policy
//! accepts back into the frontier, and hands qualifying pages to the policy
//! for collection. One address is fully visited before the next is popped,
//! and a stop request is only honored between two visits.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::extract_links;
use crate::crawler::policy::CrawlPolicy;
use crate::output::{CrawlSnapshot, CrawlStats};
use crate::CrawlError;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use tokio::sync::watch;

/// Visits between progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// Single-owner crawl engine over a fetcher and a policy
pub struct Crawler<F, P: CrawlPolicy> {
    frontier: Frontier,
    visited: HashSet<String>,
    collected: Vec<P::Record>,
    max_visits: usize,
    fetcher: F,
    policy: P,
    duplicates_skipped: usize,
    visits_by_status: BTreeMap<u16, usize>,
    stopped: bool,
}

impl<F, P> Crawler<F, P>
where
    F: Fetcher,
    P: CrawlPolicy,
{
    /// Creates an engine seeded with a single address
    ///
    /// Every engine gets its own empty frontier, visited set and sink.
    ///
    /// # Arguments
    ///
    /// * `seed` - The address the crawl starts from
    /// * `max_visits` - Upper bound on distinct addresses fetched
    /// * `fetcher` - Source of page content
    /// * `policy` - Visit, priority and collection rules
    pub fn new(seed: impl Into<String>, max_visits: usize, fetcher: F, policy: P) -> Self {
        let mut frontier = Frontier::new();
        frontier.insert_high([seed.into()]);

        Self {
            frontier,
            visited: HashSet::new(),
            collected: Vec::new(),
            max_visits,
            fetcher,
            policy,
            duplicates_skipped: 0,
            visits_by_status: BTreeMap::new(),
            stopped: false,
        }
    }

    /// Runs the crawl loop until the frontier is exhausted or the visit
    /// budget is reached
    ///
    /// Addresses popped after they were already visited are discarded, so no
    /// address reaches the fetcher twice.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - The crawl ended normally
    /// * `Err(CrawlError::EmptyFrontier)` - The loop popped an empty frontier
    pub async fn run(&mut self) -> Result<CrawlStats, CrawlError> {
        let (_stop_tx, stop_rx) = watch::channel(false);
        self.run_until(stop_rx).await
    }

    /// Runs the crawl loop like [`Crawler::run`], also ending once `stop`
    /// reads `true`
    ///
    /// The flag is checked before each pop, so a visit in progress always
    /// completes: its links are queued and its record collected before the
    /// loop returns. Whether the run ended this way is reported by
    /// [`Crawler::was_stopped`].
    pub async fn run_until(
        &mut self,
        stop: watch::Receiver<bool>,
    ) -> Result<CrawlStats, CrawlError> {
        tracing::info!("Starting crawl with a budget of {} visits", self.max_visits);
        let start_time = Instant::now();
        self.stopped = false;

        while !self.frontier.is_empty() && self.visited.len() < self.max_visits {
            if *stop.borrow() {
                self.stopped = true;
                break;
            }

            let address = self.frontier.pop()?;

            if self.visited.contains(&address) {
                self.duplicates_skipped += 1;
                tracing::trace!("Skipping already visited {}", address);
                continue;
            }

            self.visit(address).await;

            let visits = self.visited.len();
            if visits % PROGRESS_INTERVAL == 0 {
                let rate = visits as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages visited, {} in frontier, {} collected, {:.2} pages/sec",
                    visits,
                    self.frontier.len(),
                    self.collected.len(),
                    rate
                );
            }
        }

        if self.stopped {
            tracing::info!("Stop requested, crawl ended between visits");
        } else if self.frontier.is_empty() {
            tracing::info!("Frontier is empty, crawl complete");
        } else {
            tracing::info!("Visit budget of {} reached", self.max_visits);
        }

        tracing::info!(
            "Crawl finished: {} pages visited, {} collected in {:?}",
            self.visited.len(),
            self.collected.len(),
            start_time.elapsed()
        );

        Ok(self.stats())
    }

    /// Visits one address: fetch, expand the frontier, collect
    ///
    /// The address is marked visited before the fetch starts, so it counts
    /// against the budget even if the visit is interrupted.
    pub async fn visit(&mut self, address: String) {
        self.visited.insert(address.clone());
        tracing::debug!(
            "[v:{}|f:{}] Visiting: {}",
            self.visited.len(),
            self.frontier.len(),
            address
        );

        let page = self.fetcher.fetch(&address).await;
        *self.visits_by_status.entry(page.status).or_insert(0) += 1;

        if let Some(document) = &page.document {
            let links = extract_links(&address, document);
            self.expand_frontier(links);
        }

        if self.policy.should_collect(&address, page.status) {
            match self
                .policy
                .collect(&address, page.document.as_ref(), page.status)
            {
                Some(record) => {
                    tracing::debug!("Collected record from {}", address);
                    self.collected.push(record);
                }
                None => tracing::debug!("Nothing collected from {}", address),
            }
        }
    }

    /// Queues the links the policy accepts, split by priority
    fn expand_frontier(&mut self, links: HashSet<String>) {
        let (visit_first, visit_later): (Vec<String>, Vec<String>) = links
            .into_iter()
            .filter(|link| self.policy.should_visit(link) && !self.visited.contains(link))
            .partition(|link| self.policy.should_prioritize(link));

        tracing::trace!(
            "Queueing {} high and {} low priority links",
            visit_first.len(),
            visit_later.len()
        );

        self.frontier.insert_high(visit_first);
        self.frontier.insert_low(visit_later);
    }

    /// Read-only view of the pending addresses
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Read-only view of the visited addresses
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Records collected so far, in collection order
    pub fn collected(&self) -> &[P::Record] {
        &self.collected
    }

    /// Consumes the engine, returning the collected records
    pub fn into_collected(self) -> Vec<P::Record> {
        self.collected
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Whether the last run ended on a stop request rather than on an empty
    /// frontier or the visit budget
    pub fn was_stopped(&self) -> bool {
        self.stopped
    }

    /// Current counters
    pub fn stats(&self) -> CrawlStats {
        CrawlStats {
            visited: self.visited.len(),
            pending: self.frontier.len(),
            collected: self.collected.len(),
            duplicates_skipped: self.duplicates_skipped,
            visits_by_status: self.visits_by_status.clone(),
        }
    }

    /// Captures the frontier, visited set and record count right now
    pub fn snapshot(&self) -> CrawlSnapshot {
        let mut visited: Vec<String> = self.visited.iter().cloned().collect();
        visited.sort();

        CrawlSnapshot {
            taken_at: chrono::Utc::now(),
            config_hash: None,
            frontier: self.frontier.to_vec(),
            visited,
            collected: self.collected.len(),
        }
    }
}
