//! Quote Desk Daemon
//!
//! Streams a synthetic order book and sizes positions on request.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration
//! cargo run -p quotedeskd
//!
//! # Reproducible JSON stream, one book per second
//! QUOTEDESK_SEED=7 QUOTEDESK_OUTPUT=json QUOTEDESK_REFRESH_MS=1000 cargo run -p quotedeskd
//! ```
//!
//! # Environment Variables
//!
//! - `QUOTEDESK_ENV`: Environment (test, development, production)
//! - `QUOTEDESK_REFRESH_MS`: Refresh interval (default: 500)
//! - `QUOTEDESK_DEPTH`: Initial depth, one of 10/20/50/100 (default: 20)
//! - `QUOTEDESK_TICK_STEP`: Price grid step (default: 0.25)
//! - `QUOTEDESK_PRICE_SCALE`: Price decimals, or `none` (default: 2)
//! - `QUOTEDESK_AMOUNT_MIN` / `QUOTEDESK_AMOUNT_MAX`: Level amount range (default: 0.1 / 5.1)
//! - `QUOTEDESK_SEED`: Seed for amounts and quotes (default: entropy)
//! - `QUOTEDESK_ANCHOR_MID` / `QUOTEDESK_MID_JITTER`: Mid price feed (default: 67840.25 / 10)
//! - `QUOTEDESK_SPREAD_MIN` / `QUOTEDESK_SPREAD_MAX`: Spread range (default: 0.3 / 0.7)
//! - `QUOTEDESK_OUTPUT`: `text` or `json` (default: text)
//!
//! Logs go to stderr so stdout carries only rendered output.

use quotedeskd::{Config, Daemon};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("quotedeskd=info".parse()?))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        depth = config.book.depth,
        output = ?config.output,
        "Quote Desk Daemon"
    );

    // Create and run daemon
    let daemon = Daemon::new(config)?;
    daemon.run().await?;

    Ok(())
}
