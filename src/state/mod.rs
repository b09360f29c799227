//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageOutcome`: how the crawl loop finished with each dequeued URL
//! - `CrawlSession`: the frontier, seen set and page budget of one crawl run

mod page_state;
mod session;

// Re-export main types
pub use page_state::PageOutcome;
pub use session::CrawlSession;
