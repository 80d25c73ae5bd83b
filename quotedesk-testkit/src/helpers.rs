//! Assertion helpers and fixtures.

use quotedesk_domain::{BookSide, DepthLevel, MarketDepth, PositionInputs};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Tolerance for comparing values that went through division.
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.000001);

/// Assert two decimals differ by less than `tolerance`.
#[track_caller]
pub fn assert_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff < tolerance,
        "expected {} ≈ {} (diff {} >= tolerance {})",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Assert every ladder invariant on a book.
///
/// Checks ordering, positivity and cumulative sums through
/// `MarketDepth::validate`, then re-checks the two properties callers care
/// most about with individual messages.
#[track_caller]
pub fn assert_book_invariants(book: &MarketDepth) {
    if let Err(e) = book.validate() {
        panic!("book failed validation: {}", e);
    }

    for side in [BookSide::Bid, BookSide::Ask] {
        let levels = book.levels(side);
        for level in levels {
            assert!(
                level.amount.as_decimal() > Decimal::ZERO,
                "{} level at {} has non-positive amount",
                side,
                level.price
            );
        }
        for pair in levels.windows(2) {
            assert!(
                pair[1].cumulative_total >= pair[0].cumulative_total,
                "{} cumulative total decreased at {}",
                side,
                pair[1].price
            );
        }
    }
}

/// Prices of a ladder in order.
pub fn ladder_prices(levels: &[DepthLevel]) -> Vec<Decimal> {
    levels.iter().map(|level| level.price).collect()
}

/// Entry 67840, stop 67000, target 69500, risk 1000.
pub fn reference_inputs() -> PositionInputs {
    PositionInputs::new(dec!(67840), dec!(67000), dec!(69500), dec!(1000))
        .unwrap_or_else(|e| panic!("reference inputs are valid: {}", e))
}

/// Mid, spread and depth for one generator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthScenario {
    /// Mid price
    pub mid_price: Decimal,
    /// Spread
    pub spread: Decimal,
    /// Levels per side
    pub depth: usize,
}

impl DepthScenario {
    /// Highest price any bid may have (mid - spread/2).
    pub fn bid_ceiling(&self) -> Decimal {
        self.mid_price - self.spread / dec!(2)
    }

    /// Lowest price any ask may have (mid + spread/2).
    pub fn ask_floor(&self) -> Decimal {
        self.mid_price + self.spread / dec!(2)
    }
}

/// Mid 67840.25, spread 0.5, five levels per side.
pub const REFERENCE_DEPTH: DepthScenario = DepthScenario {
    mid_price: dec!(67840.25),
    spread: dec!(0.5),
    depth: 5,
};
