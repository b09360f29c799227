/// Page outcome definitions for tracking crawl progress
///
/// Every frontier entry the crawl loop pops ends in exactly one of these.
use std::fmt;

/// Represents how the crawl loop finished with one dequeued URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageOutcome {
    // ===== Terminal Success States =====
    /// Page was fetched, extracted, annotated and written to disk
    Processed,

    // ===== Terminal Skip States =====
    /// Normalized key was already in the seen set; no fetch was issued
    AlreadySeen,

    /// URL authority differs from the crawl's domain; no fetch was issued
    OutOfDomain,

    /// Content type is neither HTML nor PDF
    Unsupported,

    /// HTML or PDF yielded no text after extraction
    EmptyContent,

    // ===== Terminal Error States =====
    /// Server answered HTTP 404
    DeadLink,

    /// Network error, timeout, or a non-2xx status other than 404
    FetchFailed,
}

impl PageOutcome {
    /// All outcomes, in reporting order
    pub const ALL: [PageOutcome; 7] = [
        Self::Processed,
        Self::AlreadySeen,
        Self::OutOfDomain,
        Self::Unsupported,
        Self::EmptyContent,
        Self::DeadLink,
        Self::FetchFailed,
    ];

    /// Returns true if this represents a persisted page
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if a request went out for this URL
    pub fn was_fetched(&self) -> bool {
        !matches!(self, Self::AlreadySeen | Self::OutOfDomain)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::DeadLink | Self::FetchFailed)
    }

    /// Short label used in logs and statistics output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::AlreadySeen => "already_seen",
            Self::OutOfDomain => "out_of_domain",
            Self::Unsupported => "unsupported",
            Self::EmptyContent => "empty_content",
            Self::DeadLink => "dead_link",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
