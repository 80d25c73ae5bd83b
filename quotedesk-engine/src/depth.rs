//! Synthetic order book depth generator.
//!
//! Builds both ladders around a mid price:
//!
//! ```text
//! bid(i) = mid - spread/2 - i × tick_step
//! ask(i) = mid + spread/2 + i × tick_step
//! ```
//!
//! Amounts come from an injected [`AmountSource`], and each level carries
//! the running total of amounts from the best price outward.

use quotedesk_domain::{BookSide, DepthLevel, MarketDepth, Quantity};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::amounts::AmountSource;
use crate::error::{EngineError, EngineResult};

// =============================================================================
// DepthConfig
// =============================================================================

/// Price grid used by the generator.
///
/// # Invariants
/// - `tick_step` > 0
/// - with rounding enabled, `tick_step` >= one rounding unit (10^-scale),
///   so rounding can never merge two adjacent levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthConfig {
    tick_step: Decimal,
    price_scale: Option<u32>,
}

impl DepthConfig {
    /// Default distance between adjacent levels
    pub const DEFAULT_TICK_STEP: Decimal = dec!(0.25);
    /// Default price decimal places
    pub const DEFAULT_PRICE_SCALE: u32 = 2;

    /// Create a validated config.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` if:
    /// - tick_step <= 0
    /// - tick_step is finer than the price rounding unit
    pub fn new(tick_step: Decimal, price_scale: Option<u32>) -> EngineResult<Self> {
        if tick_step <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig(format!(
                "Tick step must be positive, got {}",
                tick_step
            )));
        }

        if let Some(scale) = price_scale {
            if scale > 28 {
                return Err(EngineError::InvalidConfig(format!(
                    "Price scale {} exceeds 28 decimal places",
                    scale
                )));
            }
            let unit = Decimal::new(1, scale);
            if tick_step < unit {
                return Err(EngineError::InvalidConfig(format!(
                    "Tick step {} is finer than the price unit {}",
                    tick_step, unit
                )));
            }
        }

        Ok(Self {
            tick_step,
            price_scale,
        })
    }

    /// Distance between adjacent levels.
    pub fn tick_step(&self) -> Decimal {
        self.tick_step
    }

    /// Decimal places prices are rounded to, if any.
    pub fn price_scale(&self) -> Option<u32> {
        self.price_scale
    }

    fn round(&self, price: Decimal) -> Decimal {
        match self.price_scale {
            Some(scale) => {
                price.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
            }
            None => price,
        }
    }
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            tick_step: Self::DEFAULT_TICK_STEP,
            price_scale: Some(Self::DEFAULT_PRICE_SCALE),
        }
    }
}

// =============================================================================
// DepthBookGenerator
// =============================================================================

/// Generates synthetic market depth.
///
/// Holds no book state between calls; only the amount source advances.
#[derive(Debug, Clone)]
pub struct DepthBookGenerator<A> {
    config: DepthConfig,
    amounts: A,
}

impl<A: AmountSource> DepthBookGenerator<A> {
    /// Create a generator from a config and an amount source.
    pub fn new(config: DepthConfig, amounts: A) -> Self {
        Self { config, amounts }
    }

    /// Get the price grid config.
    pub fn config(&self) -> &DepthConfig {
        &self.config
    }

    /// Generate `depth` levels per side around `mid_price`.
    ///
    /// - `depth == 0` returns empty ladders with mid and spread passed through
    /// - a negative spread is clamped to zero so the book is never crossed
    /// - a ladder stops early at the first level whose price is not positive,
    ///   cannot be represented, or does not move past the previous level;
    ///   near zero the bid side is shorter than `depth`
    ///
    /// The returned book always has bids strictly descending, asks strictly
    /// ascending, positive prices and amounts and running cumulative totals.
    pub fn generate(&mut self, mid_price: Decimal, spread: Decimal, depth: usize) -> MarketDepth {
        if depth == 0 {
            return MarketDepth::empty(mid_price, spread);
        }

        let effective_spread = if spread < Decimal::ZERO {
            warn!(%spread, "Negative spread clamped to zero");
            Decimal::ZERO
        } else {
            spread
        };
        let half_spread = effective_spread / dec!(2);

        let mut bids = self.ladder(BookSide::Bid, mid_price, half_spread, depth);
        let mut asks = self.ladder(BookSide::Ask, mid_price, half_spread, depth);

        // Best price first on both sides
        bids.sort_by(|a, b| b.0.cmp(&a.0));
        asks.sort_by(|a, b| a.0.cmp(&b.0));

        let book = MarketDepth {
            bids: accumulate(BookSide::Bid, bids),
            asks: accumulate(BookSide::Ask, asks),
            nominal_spread: spread,
            mid_price,
        };

        trace!(
            %mid_price,
            %spread,
            depth,
            best_bid = ?book.best_bid(),
            best_ask = ?book.best_ask(),
            "Generated market depth"
        );
        debug_assert!(book.validate().is_ok(), "generated book broke an invariant");

        book
    }

    fn ladder(
        &mut self,
        side: BookSide,
        mid_price: Decimal,
        half_spread: Decimal,
        depth: usize,
    ) -> Vec<(Decimal, Quantity)> {
        let mut levels: Vec<(Decimal, Quantity)> = Vec::with_capacity(depth);

        for i in 0..depth {
            let price = Decimal::from(i)
                .checked_mul(self.config.tick_step)
                .and_then(|steps| half_spread.checked_add(steps))
                .and_then(|offset| match side {
                    BookSide::Bid => mid_price.checked_sub(offset),
                    BookSide::Ask => mid_price.checked_add(offset),
                })
                .map(|price| self.config.round(price));

            let Some(price) = price else {
                warn!(%side, level = i, %mid_price, "Ladder stopped: price out of range");
                break;
            };
            if price <= Decimal::ZERO {
                warn!(%side, level = i, %price, "Ladder stopped at non-positive price");
                break;
            }
            // Near the representable limit additions lose precision and stall
            let advances = levels.last().map_or(true, |&(prev, _)| match side {
                BookSide::Bid => price < prev,
                BookSide::Ask => price > prev,
            });
            if !advances {
                warn!(%side, level = i, %price, "Ladder stopped: price no longer advances");
                break;
            }

            levels.push((price, self.amounts.next_amount(side, i)));
        }

        levels
    }
}

fn accumulate(side: BookSide, levels: Vec<(Decimal, Quantity)>) -> Vec<DepthLevel> {
    let mut running = Decimal::ZERO;
    let mut ladder = Vec::with_capacity(levels.len());

    for (price, amount) in levels {
        let Some(total) = running.checked_add(amount.as_decimal()) else {
            warn!(%side, %price, "Ladder stopped: cumulative total out of range");
            break;
        };
        running = total;
        ladder.push(DepthLevel {
            price,
            amount,
            cumulative_total: running,
        });
    }

    ladder
}

// =============================================================================
// Tests
// =============================================================================
