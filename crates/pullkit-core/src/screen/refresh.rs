use std::time::Duration;

use tracing::debug;

use pullkit_gesture::{PullConfig, PullDriver, ReleaseEvent};

use super::paginator::FeedPaginator;
use crate::feed::Page;
use crate::Error;

/// Refresh activity. At most one `Refreshing` exists per screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Result of applying a refresh completion.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The page was committed; `count` items are now in the list.
    Completed { count: usize },
    /// The fetch failed; pre-refresh items were restored.
    Failed(Error),
    /// Completion of a superseded fetch; dropped without touching state.
    Stale,
}

/// Turns a latched release or a manual trigger into exactly one outstanding
/// first-page fetch, and serializes the rest animation with fetch
/// completion.
///
/// The coordinator is a synchronous state machine: it decides and tags, the
/// screen issues the actual fetch with the returned ticket. While
/// `Refreshing`, further releases and manual triggers are no-ops, and only
/// the completion carrying the most recently issued ticket is applied.
pub struct RefreshCoordinator {
    state: RefreshState,
    next_ticket: u64,
    current_ticket: Option<u64>,
    hold_offset: f64,
    release_duration: Duration,
}

impl RefreshCoordinator {
    pub fn new(config: &PullConfig) -> Self {
        Self {
            state: RefreshState::Idle,
            next_ticket: 0,
            current_ticket: None,
            hold_offset: config.hold_offset,
            release_duration: config.release_duration(),
        }
    }

    #[inline]
    pub fn state(&self) -> RefreshState {
        self.state
    }

    #[inline]
    pub fn is_refreshing(&self) -> bool {
        self.state == RefreshState::Refreshing
    }

    /// Handle the gesture release.
    ///
    /// Unlatched: the offset animates straight back to rest, no fetch.
    /// Latched: enter `Refreshing`, hold the offset, and return the ticket
    /// for the fetch the caller must issue.
    pub fn on_released(
        &mut self,
        release: ReleaseEvent,
        driver: &mut PullDriver,
        paginator: &mut FeedPaginator,
    ) -> Option<u64> {
        if self.is_refreshing() {
            debug!("release ignored, refresh already in flight");
            return None;
        }

        if !release.was_latched {
            driver.animate_to(0.0, self.release_duration);
            return None;
        }

        Some(self.begin(driver, paginator))
    }

    /// Start a refresh without a gesture. No-op while one is in flight.
    pub fn trigger_manual(
        &mut self,
        driver: &mut PullDriver,
        paginator: &mut FeedPaginator,
    ) -> Option<u64> {
        if self.is_refreshing() {
            debug!("manual refresh ignored, refresh already in flight");
            return None;
        }
        Some(self.begin(driver, paginator))
    }

    fn begin(&mut self, driver: &mut PullDriver, paginator: &mut FeedPaginator) -> u64 {
        self.state = RefreshState::Refreshing;
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.current_ticket = Some(ticket);

        paginator.begin_refresh();
        driver.animate_to(self.hold_offset, self.release_duration);
        debug!(ticket, "refresh started");
        ticket
    }

    /// Apply a fetch completion.
    ///
    /// The rest animation is issued here, never from a timer: the offset
    /// returns to rest only once the matching fetch has resolved.
    pub fn complete(
        &mut self,
        ticket: u64,
        result: Result<Page, Error>,
        driver: &mut PullDriver,
        paginator: &mut FeedPaginator,
    ) -> RefreshOutcome {
        if self.current_ticket != Some(ticket) {
            debug!(ticket, "discarding stale refresh completion");
            return RefreshOutcome::Stale;
        }

        self.current_ticket = None;
        self.state = RefreshState::Idle;
        driver.animate_to(0.0, self.release_duration);

        match result {
            Ok(page) => {
                let count = page.len();
                paginator.reset(page);
                debug!(ticket, count, "refresh completed");
                RefreshOutcome::Completed { count }
            }
            Err(e) => {
                paginator.abort_refresh();
                debug!(ticket, "refresh failed: {}", e);
                RefreshOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedItem;

    fn setup() -> (RefreshCoordinator, PullDriver, FeedPaginator) {
        let config = PullConfig::default();
        (
            RefreshCoordinator::new(&config),
            PullDriver::new(&config),
            FeedPaginator::new(),
        )
    }

    fn page(ids: &[&str]) -> Page {
        ids.iter().map(|id| FeedItem::new(*id, "")).collect()
    }

    fn seeded_paginator(ids: &[&str]) -> FeedPaginator {
        let mut paginator = FeedPaginator::new();
        let (_, generation) = paginator.load_more(false).unwrap();
        paginator.complete_load(generation, Ok(page(ids)));
        paginator
    }

    #[test]
    fn test_unlatched_release_animates_to_rest_without_fetch() {
        let (mut coordinator, mut driver, mut paginator) = setup();
        driver.set_immediate(40.0);

        let ticket = coordinator.on_released(
            ReleaseEvent { was_latched: false },
            &mut driver,
            &mut paginator,
        );
        assert!(ticket.is_none());
        assert!(!coordinator.is_refreshing());
        assert_eq!(driver.target(), 0.0);
    }

    #[test]
    fn test_latched_release_holds_offset_and_issues_ticket() {
        let (mut coordinator, mut driver, _) = setup();
        let mut paginator = seeded_paginator(&["1"]);
        driver.set_immediate(90.0);

        let ticket = coordinator.on_released(
            ReleaseEvent { was_latched: true },
            &mut driver,
            &mut paginator,
        );
        assert_eq!(ticket, Some(1));
        assert!(coordinator.is_refreshing());
        assert_eq!(driver.target(), 60.0);
        // The visible list empties for the duration of the refresh.
        assert!(paginator.items().is_empty());
    }

    #[test]
    fn test_second_trigger_is_no_op_while_refreshing() {
        let (mut coordinator, mut driver, mut paginator) = setup();
        let first = coordinator.trigger_manual(&mut driver, &mut paginator);
        let second = coordinator.trigger_manual(&mut driver, &mut paginator);
        assert!(first.is_some());
        assert!(second.is_none());

        let release = coordinator.on_released(
            ReleaseEvent { was_latched: true },
            &mut driver,
            &mut paginator,
        );
        assert!(release.is_none());
    }

    #[test]
    fn test_success_commits_page_and_rests() {
        let (mut coordinator, mut driver, mut paginator) = setup();
        let ticket = coordinator.trigger_manual(&mut driver, &mut paginator).unwrap();

        let outcome = coordinator.complete(ticket, Ok(page(&["9"])), &mut driver, &mut paginator);
        assert!(matches!(outcome, RefreshOutcome::Completed { count: 1 }));
        assert!(!coordinator.is_refreshing());
        assert_eq!(driver.target(), 0.0);
        assert_eq!(paginator.items()[0].id.0, "9");
    }

    #[test]
    fn test_failure_restores_items_and_rests() {
        let (mut coordinator, mut driver, _) = setup();
        let mut paginator = seeded_paginator(&["1", "2"]);
        let ticket = coordinator.trigger_manual(&mut driver, &mut paginator).unwrap();
        assert!(paginator.items().is_empty());

        let outcome = coordinator.complete(
            ticket,
            Err(Error::Status(500)),
            &mut driver,
            &mut paginator,
        );
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert!(!coordinator.is_refreshing());
        assert_eq!(driver.target(), 0.0);
        let ids: Vec<_> = paginator.items().iter().map(|i| i.id.0.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let (mut coordinator, mut driver, mut paginator) = setup();
        let ticket = coordinator.trigger_manual(&mut driver, &mut paginator).unwrap();
        coordinator.complete(ticket, Ok(page(&["1"])), &mut driver, &mut paginator);

        // A second refresh is outstanding; the old ticket must not apply.
        let newer = coordinator.trigger_manual(&mut driver, &mut paginator).unwrap();
        assert_ne!(ticket, newer);
        let outcome = coordinator.complete(ticket, Ok(page(&["X"])), &mut driver, &mut paginator);
        assert!(matches!(outcome, RefreshOutcome::Stale));
        assert!(coordinator.is_refreshing());
        assert!(paginator.items().is_empty());
    }
}
