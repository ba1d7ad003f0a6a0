//! Debounced scheduling for the location search.
//!
//! One cancellable pending lookup: each keystroke replaces the handle, so
//! only the most recent query fires once the quiet period elapses. The app
//! polls [`Debounce::poll`] every frame; the clock is passed in so tests run
//! without sleeping.

use std::time::{Duration, Instant};

/// Quiet period between the last keystroke and the lookup.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Queries shorter than this (trimmed) never schedule a lookup.
pub const MIN_QUERY_LEN: usize = 3;

#[derive(Debug, Default)]
pub struct Debounce {
    pending: Option<(String, Instant)>,
}

impl Debounce {
    /// Replace any pending lookup with `query`, due one quiet period from
    /// `now`. Returns false (and cancels the pending lookup) when the trimmed
    /// query is too short.
    pub fn schedule(&mut self, query: &str, now: Instant) -> bool {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            self.pending = None;
            return false;
        }
        self.pending = Some((query.to_string(), now + SEARCH_DEBOUNCE));
        true
    }

    /// Drop the pending lookup, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Yield the query once its deadline has passed, consuming the handle.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(q, _)| q),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_queries_never_schedule() {
        let mut d = Debounce::default();
        let now = Instant::now();
        assert!(!d.schedule("gu", now));
        assert!(!d.is_pending());
        assert!(!d.schedule("  ab  ", now));
        assert!(d.poll(now + SEARCH_DEBOUNCE).is_none());
    }

    #[test]
    fn short_query_cancels_previous() {
        let mut d = Debounce::default();
        let now = Instant::now();
        assert!(d.schedule("guayaquil", now));
        assert!(!d.schedule("gu", now));
        assert!(d.poll(now + SEARCH_DEBOUNCE).is_none());
    }

    #[test]
    fn fires_only_after_quiet_period() {
        let mut d = Debounce::default();
        let now = Instant::now();
        d.schedule("malecon", now);
        assert!(d.poll(now + SEARCH_DEBOUNCE / 2).is_none());
        assert_eq!(d.poll(now + SEARCH_DEBOUNCE).as_deref(), Some("malecon"));
        // consumed
        assert!(d.poll(now + SEARCH_DEBOUNCE).is_none());
    }

    #[test]
    fn reschedule_replaces_pending_query() {
        let mut d = Debounce::default();
        let now = Instant::now();
        d.schedule("malec", now);
        let later = now + Duration::from_millis(300);
        d.schedule("malecon 2000", later);
        // the first deadline passes without firing
        assert!(d.poll(now + SEARCH_DEBOUNCE).is_none());
        assert_eq!(
            d.poll(later + SEARCH_DEBOUNCE).as_deref(),
            Some("malecon 2000")
        );
    }

    #[test]
    fn query_is_trimmed() {
        let mut d = Debounce::default();
        let now = Instant::now();
        d.schedule("  cerro santa ana  ", now);
        assert_eq!(
            d.poll(now + SEARCH_DEBOUNCE).as_deref(),
            Some("cerro santa ana")
        );
    }
}
