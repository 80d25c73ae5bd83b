//! Terminal rendering of books and sizing results.
//!
//! Text output mirrors the dashboard layout: a stats line, the ask ladder
//! (worst price at the top so the best ask sits next to the spread), the
//! spread marker, then the bid ladder best price first. JSON output emits
//! one object per line for piping into other tools.

use std::fmt::Write as _;

use quotedesk_domain::{BookSide, DepthLevel, MarketDepth, Quantity};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;

use crate::config::OutputFormat;
use crate::error::DaemonResult;
use crate::event_bus::{DepthUpdate, SizingOutcome};

/// Characters in a full-width volume bar.
const BAR_WIDTH: u32 = 20;

/// Formats daemon output in the configured style.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    format: OutputFormat,
}

impl Renderer {
    /// Create a renderer for the given format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// The output style in use.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a regenerated book.
    pub fn render_book(&self, update: &DepthUpdate) -> DaemonResult<String> {
        match self.format {
            OutputFormat::Text => Ok(book_text(update)),
            OutputFormat::Json => book_json(update),
        }
    }

    /// Render the acknowledgement of a depth change.
    pub fn render_depth_selected(&self, depth: usize) -> DaemonResult<String> {
        match self.format {
            OutputFormat::Text => Ok(format!("depth set to {} levels per side", depth)),
            OutputFormat::Json => Ok(serde_json::to_string(&json!({
                "type": "depth_selected",
                "depth": depth,
            }))?),
        }
    }

    /// Render a sizing result, or the hint shown when there is none.
    pub fn render_sizing(&self, outcome: &SizingOutcome) -> DaemonResult<String> {
        match self.format {
            OutputFormat::Text => Ok(sizing_text(outcome)),
            OutputFormat::Json => sizing_json(outcome),
        }
    }
}

fn book_text(update: &DepthUpdate) -> String {
    let book = &update.book;
    let mut out = String::new();

    let spread = book
        .quoted_spread()
        .map(|s| fixed(s, 2))
        .unwrap_or_else(|| "n/a".to_string());
    let spread_pct = book
        .quoted_spread_pct()
        .map(|p| format!("{}%", fixed(p, 4)))
        .unwrap_or_else(|| "n/a".to_string());

    let _ = writeln!(
        out,
        "#{}  {}  mid {}  spread {} ({})  nominal {}  depth {}",
        update.seq,
        update.generated_at.format("%H:%M:%S%.3f"),
        fixed(book.mid_price, 2),
        spread,
        spread_pct,
        fixed(book.nominal_spread, 4),
        update.depth,
    );
    let _ = writeln!(
        out,
        "bids {} (volume {})  asks {} (volume {})",
        book.bids.len(),
        fixed(book.total_volume(BookSide::Bid), 4),
        book.asks.len(),
        fixed(book.total_volume(BookSide::Ask), 4),
    );
    let _ = writeln!(out, "{:>12} {:>10} {:>12}", "PRICE", "AMOUNT", "TOTAL");

    let ask_max = book.max_amount(BookSide::Ask);
    for level in book.asks.iter().rev() {
        push_level(&mut out, "ASK", level, ask_max);
    }

    let _ = writeln!(out, "{:-^44}", format!(" spread {} ", spread));

    let bid_max = book.max_amount(BookSide::Bid);
    for level in &book.bids {
        push_level(&mut out, "BID", level, bid_max);
    }

    out.truncate(out.trim_end().len());
    out
}

fn push_level(out: &mut String, tag: &str, level: &DepthLevel, max_amount: Option<Quantity>) {
    let bar = max_amount
        .map(|max| volume_bar(level.volume_bar_pct(max)))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "{:>12} {:>10} {:>12} {} {}",
        fixed(level.price, 2),
        fixed(level.amount.as_decimal(), 4),
        fixed(level.cumulative_total, 4),
        tag,
        bar,
    );
}

/// Round half away from zero and pad to exactly `dp` decimal places.
fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

/// Bar of block characters proportional to `pct` of [`BAR_WIDTH`].
fn volume_bar(pct: Decimal) -> String {
    let cells = (pct * Decimal::from(BAR_WIDTH) / Decimal::ONE_HUNDRED)
        .round()
        .to_usize()
        .unwrap_or(0)
        .max(1);
    "█".repeat(cells)
}

fn book_json(update: &DepthUpdate) -> DaemonResult<String> {
    let book: &MarketDepth = &update.book;
    let value = json!({
        "type": "depth",
        "seq": update.seq,
        "generated_at": update.generated_at,
        "depth": update.depth,
        "mid_price": book.mid_price,
        "nominal_spread": book.nominal_spread,
        "quoted_spread": book.quoted_spread(),
        "bids": book.bids,
        "asks": book.asks,
    });
    Ok(serde_json::to_string(&value)?)
}

fn sizing_text(outcome: &SizingOutcome) -> String {
    match &outcome.result {
        Some(result) => {
            let direction = result
                .direction()
                .map(|side| side.to_string())
                .unwrap_or_else(|| "FLAT".to_string());
            format!(
                "{} size {}  R:R {}  profit {}  loss {}  notional {}",
                direction,
                fixed(result.position_size.as_decimal(), 6),
                result.risk_reward,
                fixed(result.potential_profit, 2),
                fixed(result.potential_loss, 2),
                fixed(result.notional_value(), 2),
            )
        }
        None => "no result: enter positive entry, stop, target and risk with stop != entry"
            .to_string(),
    }
}

fn sizing_json(outcome: &SizingOutcome) -> DaemonResult<String> {
    let [entry, stop, target, risk] = &outcome.fields;
    let value = json!({
        "type": "sizing",
        "inputs": {
            "entry": entry,
            "stop": stop,
            "target": target,
            "risk": risk,
        },
        "result": outcome.result.map(|result| json!({
            "direction": result.direction().map(|side| side.to_string()),
            "position_size": result.position_size,
            "risk_per_unit": result.risk_per_unit,
            "reward_per_unit": result.reward_per_unit,
            "risk_reward": result.risk_reward.as_decimal(),
            "potential_profit": result.potential_profit,
            "potential_loss": result.potential_loss,
            "notional_value": result.notional_value(),
        })),
    });
    Ok(serde_json::to_string(&value)?)
}
