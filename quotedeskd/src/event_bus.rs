//! Desk event bus.
//!
//! Carries desk events between the tasks that produce them and the daemon:
//! - Refresh scheduler → Daemon (regenerated books)
//! - Command handling → Daemon (depth changes, sizing results)
//!
//! Uses tokio broadcast channels for fan-out to multiple receivers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use quotedesk_domain::{MarketDepth, PositionResult};
use tokio::sync::broadcast;

// =============================================================================
// Event Types
// =============================================================================

/// Events that flow through the daemon event bus.
#[derive(Debug, Clone)]
pub enum DeskEvent {
    /// Scheduler produced a new book
    DepthRefreshed(DepthUpdate),

    /// User picked a different depth
    DepthSelected {
        depth: usize,
    },

    /// User asked for a position size
    PositionSized(SizingOutcome),

    /// Shutdown signal
    Shutdown,
}

/// A regenerated book, stamped for last-writer-wins ordering.
#[derive(Debug, Clone)]
pub struct DepthUpdate {
    /// Monotonically increasing per scheduler
    pub seq: u64,
    /// When the book was generated
    pub generated_at: DateTime<Utc>,
    /// Levels per side requested for this book
    pub depth: usize,
    /// The book itself
    pub book: Arc<MarketDepth>,
}

/// Result of a sizing request, including the no-result case.
#[derive(Debug, Clone)]
pub struct SizingOutcome {
    /// Raw form fields: entry, stop, target, risk
    pub fields: [String; 4],
    /// `None` when the input was insufficient
    pub result: Option<PositionResult>,
}

// =============================================================================
// Event Bus
// =============================================================================

/// Fan-out of desk events to the renderer loop and any other listener.
///
/// The refresh scheduler publishes books; command handling publishes
/// depth selections and sizing outcomes.
pub struct EventBus {
    sender: broadcast::Sender<DeskEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` desk events.
    ///
    /// A receiver that falls further behind skips the oldest books and
    /// sees a lag error instead.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a desk event, returning how many receivers got it.
    ///
    /// A book refreshed with nobody listening is dropped and counts as 0.
    pub fn send(&self, event: DeskEvent) -> usize {
        // No receivers is not an error for a refresh
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to books, depth selections and sizing outcomes published
    /// from now on.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// One subscriber's view of the desk event stream.
pub struct EventReceiver {
    receiver: broadcast::Receiver<DeskEvent>,
}

impl EventReceiver {
    /// Wait for the next desk event.
    ///
    /// `None` once the bus is gone; `Some(Err(..))` when older books were
    /// skipped because this receiver lagged.
    pub async fn recv(&mut self) -> Option<Result<DeskEvent, String>> {
        match self.receiver.recv().await {
            Ok(event) => Some(Ok(event)),
            Err(broadcast::error::RecvError::Closed) => None,
            Err(broadcast::error::RecvError::Lagged(count)) => {
                Some(Err(format!("Receiver lagged, missed {} events", count)))
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<Result<DeskEvent, String>> {
        match self.receiver.try_recv() {
            Ok(event) => Some(Ok(event)),
            Err(broadcast::error::TryRecvError::Empty) => None,
            Err(broadcast::error::TryRecvError::Closed) => None,
            Err(broadcast::error::TryRecvError::Lagged(count)) => {
                Some(Err(format!("Receiver lagged, missed {} events", count)))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
