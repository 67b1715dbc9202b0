//! Per-screen composition of the pull-to-refresh controller.
//!
//! `FeedScreen` wires the gesture tracker, the pull driver, the refresh
//! coordinator, and the paginator around one data source. All state
//! mutation happens on the thread driving the screen; fetches run as
//! spawned tasks and their completions re-enter through a channel, tagged
//! with the ticket or generation they were issued under.

pub mod paginator;
pub mod refresh;

pub use paginator::{FeedPaginator, LoadOutcome, LoadRequest};
pub use refresh::{RefreshCoordinator, RefreshOutcome, RefreshState};

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use pullkit_gesture::{GestureTracker, PullConfig, PullDriver};

use crate::feed::{FeedDataSource, FeedItem, Page};
use crate::Result;

/// Fetch completion re-entering the screen's coordination thread.
#[derive(Debug)]
pub enum ScreenEvent {
    RefreshDone {
        ticket: u64,
        result: Result<Page>,
    },
    MoreLoaded {
        generation: u64,
        result: Result<Page>,
    },
}

/// Reportable outcome of applying a completion. Stale and duplicate
/// attempts produce nothing; failures are recoverable, never fatal.
#[derive(Debug)]
pub enum FeedNotice {
    Refreshed { count: usize },
    RefreshFailed { message: String },
    Appended { count: usize },
    EndOfFeed,
    LoadFailed { message: String },
}

/// One feed screen instance: ordered items, pull offset, refresh and
/// load-more activity. Created per screen, destroyed with it.
pub struct FeedScreen {
    source: Arc<dyn FeedDataSource>,
    driver: PullDriver,
    tracker: GestureTracker,
    coordinator: RefreshCoordinator,
    paginator: FeedPaginator,
    tx: UnboundedSender<ScreenEvent>,
    rx: UnboundedReceiver<ScreenEvent>,
}

impl FeedScreen {
    pub fn new(source: Arc<dyn FeedDataSource>, config: &PullConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            driver: PullDriver::new(config),
            tracker: GestureTracker::new(config),
            coordinator: RefreshCoordinator::new(config),
            paginator: FeedPaginator::new(),
            tx,
            rx,
        }
    }

    /// Drag moved; `dy` is the cumulative downward distance. Synchronous,
    /// never blocks on I/O.
    pub fn on_move(&mut self, dy: f64) {
        self.tracker.on_move(dy, &mut self.driver);
    }

    /// Drag released. A latched release starts a refresh fetch; an
    /// unlatched one only animates the offset back to rest.
    pub fn on_release(&mut self) {
        let release = self.tracker.on_release();
        if let Some(ticket) =
            self.coordinator
                .on_released(release, &mut self.driver, &mut self.paginator)
        {
            self.spawn_refresh(ticket);
        }
    }

    /// Manual refresh trigger, e.g. from a key binding. No-op while a
    /// refresh is already in flight.
    pub fn refresh(&mut self) {
        if let Some(ticket) = self
            .coordinator
            .trigger_manual(&mut self.driver, &mut self.paginator)
        {
            self.spawn_refresh(ticket);
        }
    }

    /// Scroll approached the end of the list; fetch the next page unless
    /// loading, refreshing, or exhausted.
    pub fn load_more(&mut self) {
        if let Some((request, generation)) =
            self.paginator.load_more(self.coordinator.is_refreshing())
        {
            self.spawn_load(request, generation);
        }
    }

    /// Advance the pull animation by wall clock; returns the offset.
    pub fn tick(&mut self) -> f64 {
        self.driver.tick()
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.driver.offset()
    }

    /// Offset the active animation is heading toward.
    #[inline]
    pub fn target_offset(&self) -> f64 {
        self.driver.target()
    }

    #[inline]
    pub fn items(&self) -> &[FeedItem] {
        self.paginator.items()
    }

    #[inline]
    pub fn is_refreshing(&self) -> bool {
        self.coordinator.is_refreshing()
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.paginator.is_loading()
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.paginator.is_exhausted()
    }

    /// Apply a fetch completion under the single-writer discipline.
    pub fn apply(&mut self, event: ScreenEvent) -> Option<FeedNotice> {
        match event {
            ScreenEvent::RefreshDone { ticket, result } => {
                match self
                    .coordinator
                    .complete(ticket, result, &mut self.driver, &mut self.paginator)
                {
                    RefreshOutcome::Completed { count } => Some(FeedNotice::Refreshed { count }),
                    RefreshOutcome::Failed(e) => Some(FeedNotice::RefreshFailed {
                        message: e.to_string(),
                    }),
                    RefreshOutcome::Stale => None,
                }
            }
            ScreenEvent::MoreLoaded { generation, result } => {
                match self.paginator.complete_load(generation, result) {
                    LoadOutcome::Appended { count } => Some(FeedNotice::Appended { count }),
                    LoadOutcome::EndOfFeed => Some(FeedNotice::EndOfFeed),
                    LoadOutcome::Failed(e) => Some(FeedNotice::LoadFailed {
                        message: e.to_string(),
                    }),
                    LoadOutcome::Stale => None,
                }
            }
        }
    }

    /// Next completion if one is already queued.
    pub fn try_event(&mut self) -> Option<ScreenEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next completion. Returns `None` only if the screen's
    /// own sender was dropped, which cannot happen while `self` is alive.
    pub async fn next_event(&mut self) -> Option<ScreenEvent> {
        self.rx.recv().await
    }

    fn spawn_refresh(&self, ticket: u64) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_first_page().await;
            if tx.send(ScreenEvent::RefreshDone { ticket, result }).is_err() {
                debug!(ticket, "screen dropped before refresh completion");
            }
        });
    }

    fn spawn_load(&self, request: LoadRequest, generation: u64) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match request {
                LoadRequest::FirstPage => source.fetch_first_page().await,
                LoadRequest::After(cursor) => source.fetch_after(&cursor).await,
            };
            if tx
                .send(ScreenEvent::MoreLoaded { generation, result })
                .is_err()
            {
                debug!(generation, "screen dropped before page completion");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::feed::{ItemId, MemorySource};
    use crate::Error;

    /// Wraps another source and counts the calls reaching it.
    struct CountingSource {
        inner: MemorySource,
        first_page_calls: AtomicUsize,
        after_calls: AtomicUsize,
    }

    impl CountingSource {
        fn new(inner: MemorySource) -> Self {
            Self {
                inner,
                first_page_calls: AtomicUsize::new(0),
                after_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FeedDataSource for CountingSource {
        async fn fetch_first_page(&self) -> Result<Page> {
            self.first_page_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_first_page().await
        }

        async fn fetch_after(&self, cursor: &ItemId) -> Result<Page> {
            self.after_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_after(cursor).await
        }
    }

    /// Always fails, for exercising the rollback path.
    struct FailingSource;

    #[async_trait]
    impl FeedDataSource for FailingSource {
        async fn fetch_first_page(&self) -> Result<Page> {
            Err(Error::Status(500))
        }

        async fn fetch_after(&self, _cursor: &ItemId) -> Result<Page> {
            Err(Error::Status(500))
        }
    }

    fn seeded(count: usize) -> MemorySource {
        let items = (1..=count)
            .map(|n| FeedItem::new(n.to_string(), format!("post {}", n)))
            .collect();
        MemorySource::new(items)
    }

    fn ids(screen: &FeedScreen) -> Vec<&str> {
        screen.items().iter().map(|i| i.id.0.as_str()).collect()
    }

    async fn apply_next(screen: &mut FeedScreen) -> Option<FeedNotice> {
        let event = screen.next_event().await.expect("event channel closed");
        screen.apply(event)
    }

    #[tokio::test]
    async fn test_latched_release_refreshes_and_rests() {
        // Drag crosses the threshold at 70, release triggers the refresh,
        // the page replaces the list, and the offset heads back to rest.
        let source = Arc::new(MemorySource::new(vec![FeedItem::new("9", "fresh")]));
        let mut screen = FeedScreen::new(source, &PullConfig::default());

        for dy in [10.0, 30.0, 50.0, 70.0, 90.0] {
            screen.on_move(dy);
        }
        assert_eq!(screen.offset(), 90.0);

        screen.on_release();
        assert!(screen.is_refreshing());
        assert_eq!(screen.target_offset(), 60.0);

        let notice = apply_next(&mut screen).await;
        assert!(matches!(notice, Some(FeedNotice::Refreshed { count: 1 })));
        assert_eq!(ids(&screen), ["9"]);
        assert!(!screen.is_refreshing());
        assert_eq!(screen.target_offset(), 0.0);
    }

    #[tokio::test]
    async fn test_unlatched_release_never_fetches() {
        let source = Arc::new(CountingSource::new(seeded(5)));
        let counter = Arc::clone(&source);
        let mut screen = FeedScreen::new(source, &PullConfig::default());

        screen.on_move(40.0);
        screen.on_release();
        assert!(!screen.is_refreshing());
        assert_eq!(screen.target_offset(), 0.0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(screen.try_event().is_none());
        assert_eq!(counter.first_page_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_double_trigger_issues_one_fetch() {
        let source = Arc::new(CountingSource::new(
            seeded(5).with_latency(Duration::from_millis(30)),
        ));
        let counter = Arc::clone(&source);
        let mut screen = FeedScreen::new(source, &PullConfig::default());

        screen.refresh();
        screen.refresh();

        let notice = apply_next(&mut screen).await;
        assert!(matches!(notice, Some(FeedNotice::Refreshed { .. })));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(screen.try_event().is_none());
        assert_eq!(counter.first_page_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_more_is_no_op_while_refreshing() {
        let source = Arc::new(CountingSource::new(
            seeded(20).with_latency(Duration::from_millis(30)),
        ));
        let counter = Arc::clone(&source);
        let mut screen = FeedScreen::new(source, &PullConfig::default());

        screen.refresh();
        screen.load_more();
        assert!(!screen.is_loading());

        let notice = apply_next(&mut screen).await;
        assert!(matches!(notice, Some(FeedNotice::Refreshed { .. })));
        assert_eq!(counter.first_page_calls.load(Ordering::SeqCst), 1);
        assert_eq!(counter.after_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pagination_until_exhausted() {
        let source = Arc::new(CountingSource::new(seeded(12)));
        let counter = Arc::clone(&source);
        let mut screen = FeedScreen::new(source, &PullConfig::default());

        // Empty list: the first load fetches the first page.
        screen.load_more();
        apply_next(&mut screen).await;
        assert_eq!(screen.items().len(), 10);

        // Cursor is the last item's id.
        screen.load_more();
        let notice = apply_next(&mut screen).await;
        assert!(matches!(notice, Some(FeedNotice::Appended { count: 2 })));
        assert_eq!(screen.items().len(), 12);

        // Tail reached: the next page is empty and exhausts the feed.
        screen.load_more();
        let notice = apply_next(&mut screen).await;
        assert!(matches!(notice, Some(FeedNotice::EndOfFeed)));
        assert!(screen.is_exhausted());

        // Exhausted: no further network calls.
        screen.load_more();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(screen.try_event().is_none());
        assert_eq!(counter.first_page_calls.load(Ordering::SeqCst), 1);
        assert_eq!(counter.after_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_failure_rolls_back_items() {
        let memory = Arc::new(seeded(5));
        let mut screen = FeedScreen::new(memory, &PullConfig::default());
        screen.load_more();
        apply_next(&mut screen).await;
        assert_eq!(screen.items().len(), 5);

        // Swap in a failing source for the refresh itself.
        screen.source = Arc::new(FailingSource);
        screen.refresh();
        assert!(screen.items().is_empty());

        let notice = apply_next(&mut screen).await;
        assert!(matches!(notice, Some(FeedNotice::RefreshFailed { .. })));
        assert_eq!(screen.items().len(), 5);
        assert!(!screen.is_refreshing());
        assert_eq!(screen.target_offset(), 0.0);
    }

    #[tokio::test]
    async fn test_stale_load_completion_dropped_after_refresh_begins() {
        let source = Arc::new(seeded(10));
        let mut screen = FeedScreen::new(source, &PullConfig::default());
        screen.load_more();
        apply_next(&mut screen).await;

        let old_generation = screen.paginator.generation();
        screen.refresh();

        // A load-more completion from before the refresh must not leak
        // into the emptied list.
        let stale = ScreenEvent::MoreLoaded {
            generation: old_generation,
            result: Ok(vec![FeedItem::new("999", "stale")]),
        };
        assert!(screen.apply(stale).is_none());
        assert!(screen.items().is_empty());

        let notice = apply_next(&mut screen).await;
        assert!(matches!(notice, Some(FeedNotice::Refreshed { count: 10 })));
        assert!(!ids(&screen).contains(&"999"));
    }

    #[tokio::test]
    async fn test_refresh_of_empty_feed_completes_with_empty_list() {
        let source = Arc::new(MemorySource::new(Vec::new()));
        let mut screen = FeedScreen::new(source, &PullConfig::default());

        screen.refresh();
        let notice = apply_next(&mut screen).await;
        assert!(matches!(notice, Some(FeedNotice::Refreshed { count: 0 })));
        assert!(screen.items().is_empty());
        assert!(!screen.is_exhausted());
    }
}
