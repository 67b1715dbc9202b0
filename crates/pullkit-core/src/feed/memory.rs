use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::models::{FeedItem, ItemId, Page};
use super::source::FeedDataSource;
use crate::{Error, Result};

const DEFAULT_PAGE_SIZE: usize = 10;

/// In-memory data source backed by a fixed item list.
///
/// Pages are cut server-side: `fetch_after` returns the slice strictly after
/// the cursor item, at most `page_size` entries. Used by the demo command
/// and by tests that need deterministic paging.
pub struct MemorySource {
    items: Vec<FeedItem>,
    page_size: usize,
    latency: Duration,
}

impl MemorySource {
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self {
            items,
            page_size: DEFAULT_PAGE_SIZE,
            latency: Duration::ZERO,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Simulated transport delay before each response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn respond(&self, page: Page) -> Result<Page> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(page)
    }
}

#[async_trait]
impl FeedDataSource for MemorySource {
    async fn fetch_first_page(&self) -> Result<Page> {
        let page: Page = self.items.iter().take(self.page_size).cloned().collect();
        debug!(count = page.len(), "memory source: first page");
        self.respond(page).await
    }

    async fn fetch_after(&self, cursor: &ItemId) -> Result<Page> {
        let position = self
            .items
            .iter()
            .position(|item| &item.id == cursor)
            .ok_or_else(|| Error::InvalidCursor(cursor.clone()))?;

        let page: Page = self
            .items
            .iter()
            .skip(position + 1)
            .take(self.page_size)
            .cloned()
            .collect();
        debug!(%cursor, count = page.len(), "memory source: page after cursor");
        self.respond(page).await
    }
}
