//! Latest-book holder for the presentation layer.
//!
//! Books are not cumulative, so only the newest one matters. An update
//! whose sequence number is not newer than the current book is stale and
//! dropped (last writer wins).

use tracing::debug;

use crate::event_bus::DepthUpdate;

/// Keeps the newest book seen so far.
#[derive(Debug, Default)]
pub struct BookView {
    latest: Option<DepthUpdate>,
    stale_dropped: u64,
}

impl BookView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an update. Returns `true` if it replaced the current book.
    pub fn accept(&mut self, update: DepthUpdate) -> bool {
        if let Some(current) = &self.latest {
            if update.seq <= current.seq {
                debug!(
                    stale_seq = update.seq,
                    current_seq = current.seq,
                    "Dropping stale book"
                );
                self.stale_dropped += 1;
                return false;
            }
        }

        self.latest = Some(update);
        true
    }

    /// The newest accepted book, if any.
    pub fn latest(&self) -> Option<&DepthUpdate> {
        self.latest.as_ref()
    }

    /// How many stale updates were dropped.
    pub fn stale_dropped(&self) -> u64 {
        self.stale_dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quotedesk_domain::MarketDepth;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn update(seq: u64) -> DepthUpdate {
        DepthUpdate {
            seq,
            generated_at: Utc::now(),
            depth: 0,
            book: Arc::new(MarketDepth::empty(dec!(100), dec!(0.5))),
        }
    }

    #[test]
    fn test_accepts_newer_updates() {
        let mut view = BookView::new();

        assert!(view.latest().is_none());
        assert!(view.accept(update(1)));
        assert!(view.accept(update(3)));
        assert_eq!(view.latest().unwrap().seq, 3);
    }

    #[test]
    fn test_drops_stale_and_duplicate_updates() {
        let mut view = BookView::new();
        view.accept(update(5));

        assert!(!view.accept(update(4)));
        assert!(!view.accept(update(5)));
        assert_eq!(view.latest().unwrap().seq, 5);
        assert_eq!(view.stale_dropped(), 2);
    }
}
