//! Book refresh scheduler.
//!
//! Owns the timing policy: the generator itself is a pure, one-shot
//! computation, and this task decides when to call it.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Async Loop                              │
//! │ - interval tick      → regenerate       │
//! │ - depth selection    → regenerate now   │
//! │ - cancellation token → exit             │
//! └─────────────────────────────────────────┘
//!            ↓ DeskEvent::DepthRefreshed
//!        Event Bus
//! ```
//!
//! Every published book carries a sequence number one higher than the
//! previous one so readers can drop anything that arrives out of order.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quotedesk_engine::{
    AmountSource, DepthBookGenerator, QuoteSource, SyntheticQuotes, UniformAmounts,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::DaemonResult;
use crate::event_bus::{DepthUpdate, DeskEvent, EventBus};

/// Periodically regenerates the book and publishes it.
pub struct RefreshScheduler<A, Q> {
    generator: DepthBookGenerator<A>,
    quotes: Q,
    interval: Duration,
    depth_rx: watch::Receiver<usize>,
    event_bus: Arc<EventBus>,
    cancel_token: CancellationToken,
    seq: u64,
}

impl RefreshScheduler<UniformAmounts, SyntheticQuotes> {
    /// Build a scheduler with uniform amounts and synthetic quotes from config.
    ///
    /// With a seed, amounts and quotes are reproducible; without one both
    /// draw from OS entropy.
    pub fn from_config(
        config: &Config,
        depth_rx: watch::Receiver<usize>,
        event_bus: Arc<EventBus>,
        cancel_token: CancellationToken,
    ) -> DaemonResult<Self> {
        let (amount_rng, quote_rng) = match config.book.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (StdRng::from_entropy(), StdRng::from_entropy()),
        };

        let amounts = UniformAmounts::new(
            config.book.amount_min,
            config.book.amount_max,
            UniformAmounts::DEFAULT_SCALE,
            amount_rng,
        )?;
        let quotes = SyntheticQuotes::new(config.quotes, quote_rng)?;
        let generator = DepthBookGenerator::new(config.book.grid, amounts);

        Ok(Self::new(
            generator,
            quotes,
            config.refresh.interval,
            depth_rx,
            event_bus,
            cancel_token,
        ))
    }
}

impl<A, Q> RefreshScheduler<A, Q>
where
    A: AmountSource + Send + 'static,
    Q: QuoteSource + Send + 'static,
{
    /// Create a scheduler.
    ///
    /// # Arguments
    ///
    /// * `generator` - Depth generator with its amount source
    /// * `quotes` - Supplies mid price and spread for each refresh
    /// * `interval` - Time between refreshes
    /// * `depth_rx` - Current depth selection; a change triggers an immediate refresh
    /// * `event_bus` - Where books are published
    /// * `cancel_token` - Cancellation token for graceful shutdown
    pub fn new(
        generator: DepthBookGenerator<A>,
        quotes: Q,
        interval: Duration,
        depth_rx: watch::Receiver<usize>,
        event_bus: Arc<EventBus>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            generator,
            quotes,
            interval,
            depth_rx,
            event_bus,
            cancel_token,
            seq: 0,
        }
    }

    /// Spawn the scheduler as an async task.
    ///
    /// The task resolves to the number of books published once the
    /// cancellation token fires or the depth selection sender is dropped.
    pub fn spawn(self) -> JoinHandle<u64> {
        tokio::spawn(async move {
            info!(interval_ms = self.interval.as_millis() as u64, "Refresh scheduler started");
            let published = self.run().await;
            info!(published, "Refresh scheduler stopped");
            published
        })
    }

    async fn run(mut self) -> u64 {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let cancel_token = self.cancel_token.clone();

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    debug!("Refresh scheduler cancelled via token");
                    return self.seq;
                }
                _ = ticker.tick() => {
                    self.refresh();
                }
                changed = self.depth_rx.changed() => {
                    match changed {
                        Ok(()) => {
                            let depth = *self.depth_rx.borrow();
                            info!(depth, "Depth selection changed");
                            self.refresh();
                            // Next timed refresh counts from this one
                            ticker.reset();
                        }
                        Err(_) => {
                            debug!("Depth selection closed");
                            return self.seq;
                        }
                    }
                }
            }
        }
    }

    /// Generate one book and publish it.
    pub fn refresh(&mut self) -> DepthUpdate {
        let depth = *self.depth_rx.borrow_and_update();
        let quote = self.quotes.next_quote();
        let book = self.generator.generate(quote.mid_price, quote.spread, depth);

        self.seq += 1;
        let update = DepthUpdate {
            seq: self.seq,
            generated_at: Utc::now(),
            depth,
            book: Arc::new(book),
        };

        debug!(
            seq = update.seq,
            depth,
            mid_price = %quote.mid_price,
            spread = %quote.spread,
            "Book refreshed"
        );
        self.event_bus.send(DeskEvent::DepthRefreshed(update.clone()));

        update
    }
}

// =============================================================================
// Tests
// =============================================================================
