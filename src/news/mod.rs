// =============================================================================
// News Sources
// =============================================================================

pub mod google_rss;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::NewsItem;

pub use google_rss::GoogleNewsRss;

/// Upper bound on headlines per live request.
pub const MAX_LIVE_ITEMS: usize = 20;

/// Parameters of a live headline lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub symbol: String,
    /// Requested item count, clamped to `1..=MAX_LIVE_ITEMS` by sources.
    pub limit: usize,
    pub region: String,
    pub lang: String,
}

impl NewsQuery {
    pub fn clamped_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIVE_ITEMS)
    }
}

/// Provider of recent `{title, snippet}` pairs. Zero items is a valid answer.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<NewsItem>>;
}

#[cfg(test)]
pub(crate) mod fixed {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Source that returns the same items for every query.
    pub(crate) struct FixedNews {
        items: Vec<NewsItem>,
        fail: bool,
        pub(crate) calls: AtomicUsize,
    }

    impl FixedNews {
        pub(crate) fn new(items: Vec<NewsItem>) -> Self {
            Self {
                items,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                items: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NewsSource for FixedNews {
        async fn fetch(&self, query: &NewsQuery) -> Result<Vec<NewsItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("feed unreachable");
            }
            Ok(self.items.iter().take(query.clamped_limit()).cloned().collect())
        }
    }
}
