use async_trait::async_trait;

use super::models::{ItemId, Page};
use crate::Result;

/// Contract a feed screen asks its backing store to fulfill.
///
/// Both operations may fail with a transport error; neither streams partial
/// responses. Implementations must be shareable across tasks, since fetches
/// run off the coordination thread.
#[async_trait]
pub trait FeedDataSource: Send + Sync {
    /// Most recent items in the feed's defined order. An empty page is a
    /// valid response (empty feed).
    async fn fetch_first_page(&self) -> Result<Page>;

    /// Items strictly after `cursor` in feed order. An empty page signals
    /// end-of-feed. A cursor the source no longer knows fails with
    /// [`Error::InvalidCursor`](crate::Error::InvalidCursor).
    async fn fetch_after(&self, cursor: &ItemId) -> Result<Page>;
}
