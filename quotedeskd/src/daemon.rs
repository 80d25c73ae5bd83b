//! Daemon: Main runtime orchestrator.
//!
//! The Daemon ties together all components:
//! - Refresh Scheduler (periodic book regeneration)
//! - Event Bus (internal communication)
//! - Book View (last-writer-wins book holder)
//! - Position Sizer (on-demand sizing)
//! - Command input (one command per line)
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Initialize components
//! 3. Start the refresh scheduler
//! 4. Main event loop (render events, handle commands)
//! 5. Graceful shutdown on `quit`, SIGINT or cancellation

use std::sync::Arc;
use std::thread;

use quotedesk_engine::PositionSizer;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::book_view::BookView;
use crate::commands::{Command, HELP};
use crate::config::{validate_depth, Config};
use crate::error::{DaemonError, DaemonResult};
use crate::event_bus::{DeskEvent, EventBus, SizingOutcome};
use crate::render::Renderer;
use crate::scheduler::RefreshScheduler;

/// Lines buffered between the input reader and the event loop.
const COMMAND_BUFFER: usize = 64;

/// What the event loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Keep running, optionally printing a line
    Continue(Option<String>),
    /// Stop the daemon
    Quit,
}

// =============================================================================
// Daemon
// =============================================================================

/// The quote desk daemon.
pub struct Daemon {
    /// Configuration
    config: Config,
    /// Event bus
    event_bus: Arc<EventBus>,
    /// Current depth selection, watched by the scheduler
    depth_tx: watch::Sender<usize>,
    /// Cancellation token for graceful shutdown
    cancel_token: CancellationToken,
    /// Output formatting
    renderer: Renderer,
    /// Position size calculator
    sizer: PositionSizer,
    /// Newest book seen
    view: BookView,
}

impl Daemon {
    /// Create a new daemon from configuration.
    pub fn new(config: Config) -> DaemonResult<Self> {
        validate_depth(config.book.depth)?;

        let (depth_tx, _) = watch::channel(config.book.depth);
        let renderer = Renderer::new(config.output);

        Ok(Self {
            config,
            event_bus: Arc::new(EventBus::default()),
            depth_tx,
            cancel_token: CancellationToken::new(),
            renderer,
            sizer: PositionSizer::new(),
            view: BookView::new(),
        })
    }

    /// The daemon's event bus.
    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    /// Token that stops the daemon when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Currently selected depth.
    pub fn depth(&self) -> usize {
        *self.depth_tx.borrow()
    }

    /// The book view.
    pub fn view(&self) -> &BookView {
        &self.view
    }

    /// Run the daemon on stdin and stdout.
    ///
    /// This method blocks until `quit`, SIGINT, or cancellation.
    pub async fn run(self) -> DaemonResult<()> {
        let commands = spawn_stdin_reader();
        self.run_with_input(commands, tokio::io::stdout()).await?;
        Ok(())
    }

    /// Run the daemon with commands from a channel, writing output to `out`.
    ///
    /// A closed command channel leaves the book streaming; only `quit`,
    /// SIGINT or the cancellation token stop the loop. Returns the writer.
    pub async fn run_with_input<W>(
        mut self,
        mut commands: mpsc::Receiver<String>,
        mut out: W,
    ) -> DaemonResult<W>
    where
        W: AsyncWrite + Unpin,
    {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            depth = self.depth(),
            refresh_ms = self.config.refresh.interval.as_millis() as u64,
            "Starting quote desk daemon"
        );

        // 1. Subscribe before the scheduler publishes anything
        let mut event_receiver = self.event_bus.subscribe();

        // 2. Start the scheduler
        let scheduler = RefreshScheduler::from_config(
            &self.config,
            self.depth_tx.subscribe(),
            self.event_bus.clone(),
            self.cancel_token.clone(),
        )?;
        let scheduler_handle = scheduler.spawn();

        // 3. Main event loop
        info!("Entering main event loop");
        let cancel_token = self.cancel_token.clone();
        let mut input_open = true;
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    info!("Daemon cancelled");
                    break;
                }

                // Process events from event bus
                Some(event_result) = event_receiver.recv() => {
                    match event_result {
                        Ok(event) => match self.handle_event(event) {
                            Ok(Some(text)) => write_line(&mut out, &text).await?,
                            Ok(None) => {}
                            Err(e) => error!(error = %e, "Error handling event"),
                        },
                        Err(lag_msg) => {
                            warn!(%lag_msg, "Event receiver lagged");
                        }
                    }
                }

                // Process user commands
                line = commands.recv(), if input_open => {
                    match line {
                        Some(line) => match self.handle_command(&line) {
                            Reply::Continue(Some(text)) => write_line(&mut out, &text).await?,
                            Reply::Continue(None) => {}
                            Reply::Quit => {
                                info!("Quit requested");
                                break;
                            }
                        },
                        None => {
                            debug!("Command input closed");
                            input_open = false;
                        }
                    }
                }

                // Handle shutdown signals
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        // 4. Graceful shutdown
        self.shutdown(scheduler_handle).await?;
        out.flush().await?;

        Ok(out)
    }

    /// Handle one line of user input.
    ///
    /// Invalid commands are reported back to the user and never stop the
    /// daemon.
    pub fn handle_command(&mut self, line: &str) -> Reply {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                debug!(error = %e, "Rejected command");
                return Reply::Continue(Some(e.to_string()));
            }
        };

        match command {
            Command::Size {
                entry,
                stop,
                target,
                risk,
            } => {
                let result = self.sizer.calculate_text(&entry, &stop, &target, &risk);
                info!(
                    entry = %entry,
                    stop = %stop,
                    target = %target,
                    risk = %risk,
                    sized = result.is_some(),
                    "Position sizing requested"
                );
                self.event_bus.send(DeskEvent::PositionSized(SizingOutcome {
                    fields: [entry, stop, target, risk],
                    result,
                }));
                Reply::Continue(None)
            }
            Command::Depth(depth) => {
                self.depth_tx.send_replace(depth);
                self.event_bus.send(DeskEvent::DepthSelected { depth });
                Reply::Continue(None)
            }
            Command::Help => Reply::Continue(Some(HELP.to_string())),
            Command::Quit => Reply::Quit,
        }
    }

    /// Handle a daemon event, returning the text to print, if any.
    pub fn handle_event(&mut self, event: DeskEvent) -> DaemonResult<Option<String>> {
        match event {
            DeskEvent::DepthRefreshed(update) => {
                if !self.view.accept(update) {
                    return Ok(None);
                }
                match self.view.latest() {
                    Some(latest) => self.renderer.render_book(latest).map(Some),
                    None => Ok(None),
                }
            }
            DeskEvent::DepthSelected { depth } => {
                self.renderer.render_depth_selected(depth).map(Some)
            }
            DeskEvent::PositionSized(outcome) => self.renderer.render_sizing(&outcome).map(Some),
            DeskEvent::Shutdown => {
                self.cancel_token.cancel();
                Ok(None)
            }
        }
    }

    /// Graceful shutdown.
    async fn shutdown(&self, scheduler_handle: JoinHandle<u64>) -> DaemonResult<()> {
        info!("Shutting down daemon");

        self.cancel_token.cancel();
        self.event_bus.send(DeskEvent::Shutdown);

        let published = scheduler_handle
            .await
            .map_err(|e| DaemonError::Shutdown(format!("refresh scheduler: {}", e)))?;

        info!(
            published,
            stale_dropped = self.view.stale_dropped(),
            "Daemon shutdown complete"
        );
        Ok(())
    }
}

async fn write_line<W>(out: &mut W, text: &str) -> DaemonResult<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

/// Read stdin lines on a dedicated thread.
///
/// Blocking reads stay off the runtime so a pending read never holds up
/// shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);

    thread::spawn(move || {
        for line in std::io::stdin().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read command input");
                    break;
                }
            }
        }
    });

    rx
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::event_bus::DepthUpdate;
    use chrono::Utc;
    use quotedesk_domain::MarketDepth;
    use rust_decimal_macros::dec;

    fn update(seq: u64) -> DepthUpdate {
        DepthUpdate {
            seq,
            generated_at: Utc::now(),
            depth: 0,
            book: Arc::new(MarketDepth::empty(dec!(100), dec!(0.5))),
        }
    }

    #[test]
    fn test_new_rejects_unsupported_depth() {
        let mut config = Config::test();
        config.book.depth = 15;

        assert!(matches!(Daemon::new(config), Err(DaemonError::Config(_))));
    }

    #[test]
    fn test_depth_command_updates_selection() {
        let mut daemon = Daemon::new(Config::test()).unwrap();
        let mut receiver = daemon.event_bus().subscribe();

        assert_eq!(daemon.handle_command("depth 50"), Reply::Continue(None));
        assert_eq!(daemon.depth(), 50);
        assert!(matches!(
            receiver.try_recv(),
            Some(Ok(DeskEvent::DepthSelected { depth: 50 }))
        ));
    }

    #[test]
    fn test_invalid_commands_are_reported() {
        let mut daemon = Daemon::new(Config::test()).unwrap();

        match daemon.handle_command("depth 15") {
            Reply::Continue(Some(text)) => assert!(text.contains("unsupported depth")),
            other => panic!("unexpected reply: {:?}", other),
        }
        assert_eq!(daemon.depth(), 10);

        assert!(matches!(
            daemon.handle_command("fly away"),
            Reply::Continue(Some(_))
        ));
        assert_eq!(daemon.handle_command("quit"), Reply::Quit);
    }

    #[test]
    fn test_size_command_publishes_outcome() {
        let mut daemon = Daemon::new(Config::test()).unwrap();
        let mut receiver = daemon.event_bus().subscribe();

        daemon.handle_command("size 67840 67000 69500 1000");
        daemon.handle_command("size 100 100 110 50");

        match receiver.try_recv() {
            Some(Ok(DeskEvent::PositionSized(outcome))) => {
                let result = outcome.result.unwrap();
                assert_eq!(result.potential_loss, dec!(1000));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match receiver.try_recv() {
            Some(Ok(DeskEvent::PositionSized(outcome))) => assert!(outcome.result.is_none()),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_stale_books_are_not_rendered() {
        let mut daemon = Daemon::new(Config::test()).unwrap();

        assert!(daemon.handle_event(DeskEvent::DepthRefreshed(update(2))).unwrap().is_some());
        assert!(daemon.handle_event(DeskEvent::DepthRefreshed(update(1))).unwrap().is_none());
        assert_eq!(daemon.view().latest().unwrap().seq, 2);
        assert_eq!(daemon.view().stale_dropped(), 1);
    }

    #[test]
    fn test_shutdown_event_cancels() {
        let mut daemon = Daemon::new(Config::test()).unwrap();
        let token = daemon.cancel_token();

        assert!(daemon.handle_event(DeskEvent::Shutdown).unwrap().is_none());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_quit_stops_run_loop() {
        let mut config = Config::test();
        config.output = OutputFormat::Text;
        let daemon = Daemon::new(config).unwrap();
        let (tx, rx) = mpsc::channel(8);

        tx.send("quit".to_string()).await.unwrap();
        let out = daemon.run_with_input(rx, Vec::new()).await.unwrap();

        // Whatever was printed before quit is valid UTF-8 text
        assert!(String::from_utf8(out).is_ok());
    }
}
