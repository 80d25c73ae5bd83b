//! Quote Desk Daemon Library
//!
//! Runtime for the synthetic order book and position sizing desk.
//!
//! # Architecture
//!
//! ```text
//! stdin → Commands → Daemon ──depth──→ Refresh Scheduler → Depth Generator
//!                      ↑                      │
//!                      └────── Event Bus ─────┘
//!                      ↓
//!                  Book View → Renderer → stdout
//! ```
//!
//! # Components
//!
//! - **Daemon**: Main runtime orchestrator
//! - **Refresh Scheduler**: Regenerates the book on a fixed interval
//! - **Event Bus**: Internal communication (books, sizing results, depth changes)
//! - **Book View**: Keeps only the newest book
//! - **Renderer**: Text ladder or JSON lines
//! - **Config**: Environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use quotedeskd::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     Daemon::new(config)?.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod book_view;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod error;
pub mod event_bus;
pub mod render;
pub mod scheduler;

// Re-exports for convenience
pub use book_view::BookView;
pub use commands::{Command, CommandError};
pub use config::{
    validate_depth, BookConfig, Config, Environment, OutputFormat, RefreshConfig, DEPTH_OPTIONS,
};
pub use daemon::{Daemon, Reply};
pub use error::{DaemonError, DaemonResult};
pub use event_bus::{DepthUpdate, DeskEvent, EventBus, EventReceiver, SizingOutcome};
pub use render::Renderer;
pub use scheduler::RefreshScheduler;
