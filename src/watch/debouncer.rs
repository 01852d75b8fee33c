//! Pure timing and coalescing for watch events.
//!
//! Changes are coalesced per asset category: a burst of saves under one
//! category yields a single rebuild of that category. A quiet period
//! (debounce) must pass after the last event, and a cooldown after the last
//! rebuild, before the pending set is released.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::core::Category;

pub(super) const DEBOUNCE_MS: u64 = 300;
pub(super) const REBUILD_COOLDOWN_MS: u64 = 800;

pub(super) struct Debouncer {
    pending: BTreeSet<Category>,
    last_event: Option<Instant>,
    last_rebuild: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            pending: BTreeSet::new(),
            last_event: None,
            last_rebuild: None,
        }
    }

    /// Record a change under `category`.
    pub(super) fn note(&mut self, category: Category) {
        self.pending.insert(category);
        self.last_event = Some(Instant::now());
    }

    /// Take the pending categories if debounce + cooldown have elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<BTreeSet<Category>> {
        if !self.is_ready() {
            return None;
        }

        let batch = std::mem::take(&mut self.pending);
        self.last_event = None;

        if batch.is_empty() {
            return None;
        }

        self.last_rebuild = Some(Instant::now());
        Some(batch)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }

        if let Some(last_rebuild) = self.last_rebuild
            && last_rebuild.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS)
        {
            return false;
        }

        !self.pending.is_empty()
    }

    /// Precise sleep duration until the next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        let debounce_remaining =
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());

        let cooldown_remaining = self
            .last_rebuild
            .map(|t| Duration::from_millis(REBUILD_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_without_events() {
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.is_ready());
        assert!(debouncer.take_if_ready().is_none());
    }

    #[test]
    fn test_fresh_event_waits_for_debounce() {
        let mut debouncer = Debouncer::new();
        debouncer.note(Category::Styles);
        assert!(!debouncer.is_ready());
        assert!(debouncer.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));
    }

    #[test]
    fn test_ready_after_debounce_window() {
        let mut debouncer = Debouncer::new();
        debouncer.note(Category::Styles);
        debouncer.note(Category::Scripts);
        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 50));

        let batch = debouncer.take_if_ready().unwrap();
        assert_eq!(
            batch.into_iter().collect::<Vec<_>>(),
            vec![Category::Styles, Category::Scripts]
        );
        assert!(debouncer.pending.is_empty());
    }

    #[test]
    fn test_duplicate_events_coalesce() {
        let mut debouncer = Debouncer::new();
        debouncer.note(Category::Styles);
        debouncer.note(Category::Styles);
        debouncer.note(Category::Styles);
        assert_eq!(debouncer.pending.len(), 1);
    }

    #[test]
    fn test_cooldown_blocks_back_to_back_rebuilds() {
        let mut debouncer = Debouncer::new();
        debouncer.note(Category::Html);
        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 50));
        assert!(debouncer.take_if_ready().is_some());

        // Immediately queue another change: cooldown holds it back
        debouncer.note(Category::Html);
        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 50));
        assert!(!debouncer.is_ready());

        // Once the cooldown has passed it releases
        debouncer.last_rebuild =
            Some(Instant::now() - Duration::from_millis(REBUILD_COOLDOWN_MS + 50));
        assert!(debouncer.take_if_ready().is_some());
    }
}
