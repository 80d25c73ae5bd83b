//! Market Depth Types
//!
//! Order book ladders as rendered by the dashboard. A ladder is an ordered
//! list of price levels, best price first, each carrying the running total
//! of quantity from the best price outward.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value_objects::{BookSide, DomainError, Quantity};

/// Narrowest volume bar drawn for a level, in percent of the row width.
pub const MIN_VOLUME_BAR_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

// =============================================================================
// DepthLevel
// =============================================================================

/// A single price level on one side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Level price
    pub price: Decimal,
    /// Quantity resting at this price
    pub amount: Quantity,
    /// Sum of amounts from the best level up to and including this one
    pub cumulative_total: Decimal,
}

impl DepthLevel {
    /// Width of this level's volume bar relative to the largest level.
    ///
    /// Returns `max(amount / max_amount × 100, 5)` so small levels stay visible.
    pub fn volume_bar_pct(&self, max_amount: Quantity) -> Decimal {
        let pct = self.amount.as_decimal() / max_amount.as_decimal() * Decimal::ONE_HUNDRED;
        pct.max(MIN_VOLUME_BAR_PCT)
    }
}

// =============================================================================
// MarketDepth
// =============================================================================

/// Both ladders of a synthetic order book.
///
/// Regenerated wholesale on every refresh; nothing carries over between
/// two books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDepth {
    /// Bid levels, highest price first
    pub bids: Vec<DepthLevel>,
    /// Ask levels, lowest price first
    pub asks: Vec<DepthLevel>,
    /// Spread the book was generated with
    pub nominal_spread: Decimal,
    /// Mid price the book was generated around
    pub mid_price: Decimal,
}

impl MarketDepth {
    /// Create a book with no levels.
    pub fn empty(mid_price: Decimal, nominal_spread: Decimal) -> Self {
        Self {
            bids: Vec::new(),
            asks: Vec::new(),
            nominal_spread,
            mid_price,
        }
    }

    /// Levels for one side, best price first.
    pub fn levels(&self, side: BookSide) -> &[DepthLevel] {
        match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        }
    }

    /// True when both ladders are empty.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Get the best bid price (highest bid).
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|level| level.price)
    }

    /// Get the best ask price (lowest ask).
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|level| level.price)
    }

    /// Spread actually shown by the ladders (best ask - best bid).
    ///
    /// May differ from `nominal_spread` by up to one rounding unit.
    pub fn quoted_spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Quoted spread as a percentage of the mid price.
    pub fn quoted_spread_pct(&self) -> Option<Decimal> {
        if self.mid_price.is_zero() {
            return None;
        }
        self.quoted_spread()
            .map(|spread| spread / self.mid_price * Decimal::ONE_HUNDRED)
    }

    /// Largest single-level amount on one side.
    pub fn max_amount(&self, side: BookSide) -> Option<Quantity> {
        self.levels(side).iter().map(|level| level.amount).max()
    }

    /// Total quantity on one side.
    pub fn total_volume(&self, side: BookSide) -> Decimal {
        self.levels(side)
            .last()
            .map(|level| level.cumulative_total)
            .unwrap_or(Decimal::ZERO)
    }

    /// Check every ladder invariant.
    ///
    /// - bids strictly descending, asks strictly ascending
    /// - every price > 0
    /// - every amount > 0
    /// - each cumulative total equals the previous total plus the level amount
    ///
    /// # Errors
    /// Returns `DomainError::InvalidDepth` describing the first violation
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_ladder(BookSide::Bid, &self.bids)?;
        validate_ladder(BookSide::Ask, &self.asks)
    }
}

fn validate_ladder(side: BookSide, levels: &[DepthLevel]) -> Result<(), DomainError> {
    let mut running = Decimal::ZERO;

    for (i, level) in levels.iter().enumerate() {
        if level.amount.as_decimal() <= Decimal::ZERO {
            return Err(DomainError::InvalidDepth(format!(
                "{} level {} has non-positive amount {}",
                side, i, level.amount
            )));
        }

        if level.price <= Decimal::ZERO {
            return Err(DomainError::InvalidDepth(format!(
                "{} level {} has non-positive price {}",
                side, i, level.price
            )));
        }

        running = running
            .checked_add(level.amount.as_decimal())
            .ok_or_else(|| {
                DomainError::InvalidDepth(format!(
                    "{} level {} cumulative total overflows",
                    side, i
                ))
            })?;
        if level.cumulative_total != running {
            return Err(DomainError::InvalidDepth(format!(
                "{} level {} cumulative total {} does not match running sum {}",
                side, i, level.cumulative_total, running
            )));
        }

        if let Some(prev) = i.checked_sub(1).map(|p| levels[p].price) {
            let ordered = match side {
                BookSide::Bid => level.price < prev,
                BookSide::Ask => level.price > prev,
            };
            if !ordered {
                return Err(DomainError::InvalidDepth(format!(
                    "{} level {} price {} is out of order after {}",
                    side, i, level.price, prev
                )));
            }
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn level(price: Decimal, amount: Decimal, cumulative_total: Decimal) -> DepthLevel {
        DepthLevel {
            price,
            amount: Quantity::new(amount).unwrap(),
            cumulative_total,
        }
    }

    fn sample_book() -> MarketDepth {
        MarketDepth {
            bids: vec![
                level(dec!(99.75), dec!(1.0), dec!(1.0)),
                level(dec!(99.50), dec!(2.0), dec!(3.0)),
            ],
            asks: vec![
                level(dec!(100.25), dec!(0.5), dec!(0.5)),
                level(dec!(100.50), dec!(4.0), dec!(4.5)),
            ],
            nominal_spread: dec!(0.5),
            mid_price: dec!(100),
        }
    }

    #[test]
    fn test_best_prices_and_spread() {
        let book = sample_book();

        assert_eq!(book.best_bid(), Some(dec!(99.75)));
        assert_eq!(book.best_ask(), Some(dec!(100.25)));
        assert_eq!(book.quoted_spread(), Some(dec!(0.5)));
        assert_eq!(book.quoted_spread_pct(), Some(dec!(0.5)));
    }

    #[test]
    fn test_empty_book() {
        let book = MarketDepth::empty(dec!(100), dec!(0.5));

        assert!(book.is_empty());
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.quoted_spread(), None);
        assert_eq!(book.max_amount(BookSide::Ask), None);
        assert_eq!(book.total_volume(BookSide::Bid), Decimal::ZERO);
        assert!(book.validate().is_ok());
    }

    #[test]
    fn test_volume_totals() {
        let book = sample_book();

        assert_eq!(book.total_volume(BookSide::Bid), dec!(3.0));
        assert_eq!(book.total_volume(BookSide::Ask), dec!(4.5));
        assert_eq!(book.max_amount(BookSide::Ask).unwrap().as_decimal(), dec!(4.0));
    }

    #[test]
    fn test_volume_bar_pct() {
        let book = sample_book();
        let max = book.max_amount(BookSide::Ask).unwrap();

        assert_eq!(book.asks[1].volume_bar_pct(max), dec!(100));
        // 0.5 / 4 = 12.5%
        assert_eq!(book.asks[0].volume_bar_pct(max), dec!(12.5));

        let tiny = level(dec!(101), dec!(0.01), dec!(0.01));
        assert_eq!(tiny.volume_bar_pct(max), MIN_VOLUME_BAR_PCT);
    }

    #[test]
    fn test_validate_accepts_well_formed_book() {
        assert!(sample_book().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unsorted_bids() {
        let mut book = sample_book();
        book.bids[1].price = dec!(99.80);

        assert!(matches!(book.validate(), Err(DomainError::InvalidDepth(_))));
    }

    #[test]
    fn test_validate_rejects_equal_ask_prices() {
        let mut book = sample_book();
        book.asks[1].price = book.asks[0].price;

        assert!(book.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_price() {
        let mut book = sample_book();
        book.bids[1].price = dec!(-0.25);

        assert!(matches!(
            book.validate(),
            Err(DomainError::InvalidDepth(msg)) if msg.contains("price")
        ));
    }

    #[test]
    fn test_validate_rejects_bad_cumulative_total() {
        let mut book = sample_book();
        book.asks[1].cumulative_total = dec!(4.0);

        assert!(book.validate().is_err());
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(sample_book()).unwrap();

        assert_eq!(json["bids"].as_array().unwrap().len(), 2);
        assert!(json.get("nominal_spread").is_some());
    }
}
