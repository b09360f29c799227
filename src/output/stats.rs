//! Crawl statistics
//!
//! Counters accumulated by the coordinator while it runs, printed once the
//! crawl ends.

use crate::state::PageOutcome;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the crawl ended (None while running)
    pub finished_at: Option<DateTime<Utc>>,

    /// Frontier entries popped
    pub iterations: u64,

    /// Pages written to disk
    pub pages_processed: u64,

    /// Links pushed onto the frontier
    pub links_queued: u64,

    /// Count of frontier entries by outcome
    pub by_outcome: HashMap<PageOutcome, u64>,
}

impl CrawlStatistics {
    /// Starts a new set of counters
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            iterations: 0,
            pages_processed: 0,
            links_queued: 0,
            by_outcome: HashMap::new(),
        }
    }

    /// Records the outcome of one frontier entry
    pub fn record(&mut self, outcome: PageOutcome) {
        self.iterations += 1;
        if outcome == PageOutcome::Processed {
            self.pages_processed += 1;
        }
        *self.by_outcome.entry(outcome).or_insert(0) += 1;
    }

    /// Records links pushed onto the frontier
    pub fn record_queued(&mut self, count: usize) {
        self.links_queued += count as u64;
    }

    /// Stamps the end time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of entries recorded with `outcome`
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    /// Entries that ended in a fetch error or dead link
    pub fn error_count(&self) -> u64 {
        self.by_outcome
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// Elapsed seconds between start and finish (or now, if still running)
    pub fn duration_seconds(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds()
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    println!("  Duration: {}s", stats.duration_seconds());
    println!("  Frontier entries handled: {}", stats.iterations);
    println!("  Links queued: {}", stats.links_queued);
    println!();

    println!("Entries by Outcome:");
    let mut outcome_counts: Vec<_> = stats.by_outcome.iter().collect();
    outcome_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    for (outcome, count) in outcome_counts {
        let percentage = if stats.iterations > 0 {
            (*count as f64 / stats.iterations as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", outcome, count, percentage);
    }
    println!();

    let fetched: u64 = PageOutcome::ALL
        .iter()
        .filter(|outcome| outcome.was_fetched())
        .map(|outcome| stats.count(*outcome))
        .sum();
    let success_rate = if fetched > 0 {
        (stats.pages_processed as f64 / fetched as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} fetched pages written)",
        success_rate, stats.pages_processed, fetched
    );
    println!("Fetch Errors: {} (dead links and failed requests)", stats.error_count());
}
