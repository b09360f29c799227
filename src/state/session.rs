use crate::url::{extract_authority, normalize_url};
use crate::UrlResult;
use std::collections::{HashSet, VecDeque};

/// State of one crawl run
///
/// The session owns the frontier, the seen set and the page budget. It is
/// created from the seed URL, mutated only by the crawl engine, and dropped
/// when the run ends; nothing in it survives across runs.
///
/// The frontier is worked as a stack: [`CrawlSession::pop_next`] returns the
/// most recently pushed URL, which makes the traversal depth-first leaning.
/// The frontier does not enforce uniqueness; the seen set does, at dequeue.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    /// Authority of the seed URL, fixed for the lifetime of the session
    local_domain: String,

    /// Candidate URLs; pushed and popped at the back
    frontier: VecDeque<String>,

    /// Normalized keys of every URL ever dequeued for processing; only grows
    seen: HashSet<String>,

    /// Pages successfully persisted
    processed_count: u32,

    /// Maximum number of pages to persist
    page_budget: u32,
}

impl CrawlSession {
    /// Creates a session seeded with `start_url`
    ///
    /// # Arguments
    ///
    /// * `start_url` - The seed; its authority becomes the local domain
    /// * `page_budget` - Maximum number of pages to persist
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSession)` - Session with the seed on the frontier
    /// * `Err(UrlError)` - The seed is not an absolute http(s) URL
    pub fn new(start_url: &str, page_budget: u32) -> UrlResult<Self> {
        let local_domain = extract_authority(start_url)?;

        let mut frontier = VecDeque::new();
        frontier.push_back(start_url.to_string());

        Ok(Self {
            local_domain,
            frontier,
            seen: HashSet::new(),
            processed_count: 0,
            page_budget,
        })
    }

    /// The authority every fetched URL must match
    pub fn local_domain(&self) -> &str {
        &self.local_domain
    }

    /// Pushes a URL onto the back of the frontier
    pub fn push(&mut self, url: impl Into<String>) {
        self.frontier.push_back(url.into());
    }

    /// Pops the most recently pushed URL
    pub fn pop_next(&mut self) -> Option<String> {
        self.frontier.pop_back()
    }

    /// Inserts a normalized key into the seen set
    ///
    /// Returns `false` if the key was already present, meaning the URL has
    /// already been claimed and must not be processed again.
    pub fn mark_seen(&mut self, key: &str) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        self.seen.insert(key.to_string())
    }

    /// Returns true if the URL's normalized key is in the seen set
    pub fn is_seen(&self, url: &str) -> bool {
        self.seen.contains(&normalize_url(url))
    }

    /// Pops frontier entries until one whose normalized key is unseen
    ///
    /// The returned URL is already marked seen, so pop and mark happen as one
    /// step. Every entry skipped because it was already seen is reported to
    /// `on_skip`.
    pub fn claim_next(&mut self, mut on_skip: impl FnMut(&str)) -> Option<String> {
        while let Some(url) = self.pop_next() {
            let key = normalize_url(&url);
            if self.mark_seen(&key) {
                return Some(url);
            }
            on_skip(&url);
        }
        None
    }

    /// Records one persisted page
    pub fn record_processed(&mut self) {
        self.processed_count += 1;
    }

    /// Pages persisted so far
    pub fn processed_count(&self) -> u32 {
        self.processed_count
    }

    /// Maximum number of pages to persist
    pub fn page_budget(&self) -> u32 {
        self.page_budget
    }

    /// Returns true once the page budget has been used up
    pub fn budget_reached(&self) -> bool {
        self.processed_count >= self.page_budget
    }

    /// Returns true when the crawl has nothing left to do
    pub fn is_finished(&self) -> bool {
        self.frontier.is_empty() || self.budget_reached()
    }

    /// Returns the number of URLs in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns the number of keys in the seen set
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
