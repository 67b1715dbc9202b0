use std::collections::HashSet;
use std::mem;

use tracing::debug;

use crate::feed::{FeedItem, ItemId, Page};
use crate::Error;

/// What the paginator wants fetched next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    FirstPage,
    After(ItemId),
}

/// Result of applying a page-load completion.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Page appended; `count` items survived dedup.
    Appended { count: usize },
    /// Empty page: the feed is exhausted until the next reset.
    EndOfFeed,
    /// Completion from before a reset; dropped without touching state.
    Stale,
    /// The load failed; items unchanged, retry later is allowed.
    Failed(Error),
}

/// Ordered item list with cursor-based append and end-of-feed detection.
///
/// The list holds unique ids in feed order. One load may be in flight at a
/// time; a refresh supersedes any in-flight load by bumping the reset
/// generation, so that load's completion is recognizably stale.
pub struct FeedPaginator {
    items: Vec<FeedItem>,
    seen: HashSet<ItemId>,
    loading: bool,
    exhausted: bool,
    generation: u64,
    stash: Option<Vec<FeedItem>>,
}

impl Default for FeedPaginator {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedPaginator {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            loading: false,
            exhausted: false,
            generation: 0,
            stash: None,
        }
    }

    #[inline]
    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Current reset generation; completions carrying an older value are
    /// stale.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ask for the next page.
    ///
    /// No-op while a load is in flight, while a refresh is running, or once
    /// the feed is exhausted. Otherwise marks the paginator loading and
    /// returns the request to issue together with the generation to tag its
    /// completion with.
    pub fn load_more(&mut self, refreshing: bool) -> Option<(LoadRequest, u64)> {
        if self.loading || refreshing || self.exhausted {
            debug!(
                loading = self.loading,
                refreshing,
                exhausted = self.exhausted,
                "load more ignored"
            );
            return None;
        }

        self.loading = true;
        let request = match self.items.last() {
            None => LoadRequest::FirstPage,
            Some(last) => LoadRequest::After(last.id.clone()),
        };
        Some((request, self.generation))
    }

    /// Apply a page-load completion.
    pub fn complete_load(&mut self, generation: u64, result: Result<Page, Error>) -> LoadOutcome {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale page load");
            return LoadOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(page) if page.is_empty() => {
                self.exhausted = true;
                LoadOutcome::EndOfFeed
            }
            Ok(page) => {
                let count = self.append(page);
                LoadOutcome::Appended { count }
            }
            Err(e) => LoadOutcome::Failed(e),
        }
    }

    /// Enter the refresh window: the visible list empties, the pre-refresh
    /// items are stashed for rollback, and any in-flight load becomes stale.
    pub fn begin_refresh(&mut self) {
        self.stash = Some(mem::take(&mut self.items));
        self.seen.clear();
        self.loading = false;
        self.generation += 1;
    }

    /// Replace the list wholesale with a fresh first page.
    ///
    /// Clears `exhausted` and `loading` unconditionally and drops any stash.
    pub fn reset(&mut self, page: Page) {
        self.items.clear();
        self.seen.clear();
        self.append(page);
        self.loading = false;
        self.exhausted = false;
        self.stash = None;
        self.generation += 1;
    }

    /// Roll back a failed refresh to the pre-refresh items.
    pub fn abort_refresh(&mut self) {
        if let Some(stash) = self.stash.take() {
            self.seen = stash.iter().map(|item| item.id.clone()).collect();
            self.items = stash;
        }
    }

    /// Append in returned order, dropping ids already present.
    fn append(&mut self, page: Page) -> usize {
        let mut count = 0;
        for item in page {
            if self.seen.insert(item.id.clone()) {
                self.items.push(item);
                count += 1;
            } else {
                debug!(id = %item.id, "dropping duplicate item");
            }
        }
        count
    }
}
