//! Depth generator properties.
//!
//! For any depth, mid and spread:
//! - bids strictly descending, asks strictly ascending
//! - every price and amount > 0, bids stopping short of zero
//! - cumulative totals never decrease
//! - the quoted spread stays within one tick of the nominal spread

use proptest::prelude::*;
use quotedesk_domain::{BookSide, Quantity};
use quotedesk_engine::{
    DepthBookGenerator, DepthConfig, FixedAmount, QuoteSource, SyntheticQuoteConfig,
    SyntheticQuotes, UniformAmounts,
};
use quotedesk_testkit::{assert_book_invariants, ladder_prices, REFERENCE_DEPTH};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_reference_depth_scenario() {
    let scenario = REFERENCE_DEPTH;
    let mut generator = DepthBookGenerator::new(DepthConfig::default(), UniformAmounts::seeded(1));

    let book = generator.generate(scenario.mid_price, scenario.spread, scenario.depth);

    assert_eq!(book.bids.len(), 5);
    assert_eq!(book.asks.len(), 5);
    assert_book_invariants(&book);

    assert!(ladder_prices(&book.bids).iter().all(|p| *p <= scenario.bid_ceiling()));
    assert!(ladder_prices(&book.asks).iter().all(|p| *p >= scenario.ask_floor()));

    for side in [BookSide::Bid, BookSide::Ask] {
        let totals: Vec<_> = book.levels(side).iter().map(|l| l.cumulative_total).collect();
        assert!(totals.windows(2).all(|w| w[1] > w[0]), "{} totals not strictly increasing", side);
    }
}

#[test]
fn test_zero_depth_scenario() {
    let mut generator = DepthBookGenerator::new(DepthConfig::default(), UniformAmounts::seeded(1));

    let book = generator.generate(dec!(67840.25), dec!(0.5), 0);

    assert!(book.bids.is_empty());
    assert!(book.asks.is_empty());
    assert_eq!(book.mid_price, dec!(67840.25));
    assert_eq!(book.nominal_spread, dec!(0.5));
}

#[test]
fn test_every_dashboard_depth_option() {
    let mut generator = DepthBookGenerator::new(DepthConfig::default(), UniformAmounts::seeded(5));

    for depth in [10, 20, 50, 100] {
        let book = generator.generate(dec!(67840.25), dec!(0.5), depth);
        assert_eq!(book.bids.len(), depth);
        assert_eq!(book.asks.len(), depth);
        assert_book_invariants(&book);
    }
}

#[test]
fn test_regeneration_changes_amounts_not_invariants() {
    let mut generator = DepthBookGenerator::new(DepthConfig::default(), UniformAmounts::seeded(8));

    let first = generator.generate(dec!(100), dec!(0.5), 20);
    let second = generator.generate(dec!(100), dec!(0.5), 20);

    assert_eq!(ladder_prices(&first.bids), ladder_prices(&second.bids));
    assert_ne!(first.bids, second.bids);
    assert_book_invariants(&first);
    assert_book_invariants(&second);
}

#[test]
fn test_synthetic_quotes_drive_valid_books() -> anyhow::Result<()> {
    let mut quotes = SyntheticQuotes::seeded(SyntheticQuoteConfig::default(), 2)?;
    let mut generator = DepthBookGenerator::new(DepthConfig::default(), UniformAmounts::seeded(2));

    for _ in 0..25 {
        let quote = quotes.next_quote();
        let book = generator.generate(quote.mid_price, quote.spread, 20);
        assert_book_invariants(&book);

        let quoted = book
            .quoted_spread()
            .ok_or_else(|| anyhow::anyhow!("book has an empty side"))?;
        assert!((quoted - quote.spread).abs() <= DepthConfig::DEFAULT_TICK_STEP);
    }

    Ok(())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_generated_books_hold_invariants(
        mid_units in 1i64..100_000_000,
        spread_units in 0i64..10_000,
        depth in 0usize..150,
        seed in any::<u64>(),
    ) {
        let mid = Decimal::new(mid_units, 2);
        let spread = Decimal::new(spread_units, 2);
        let mut generator =
            DepthBookGenerator::new(DepthConfig::default(), UniformAmounts::seeded(seed));

        let book = generator.generate(mid, spread, depth);

        // Bids stop before the first level that would round to zero or below
        let positive_bids = (0..depth)
            .map(|i| {
                (mid - spread / dec!(2) - Decimal::from(i) * DepthConfig::DEFAULT_TICK_STEP)
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            })
            .take_while(|price| *price > Decimal::ZERO)
            .count();
        prop_assert_eq!(book.bids.len(), positive_bids);
        prop_assert_eq!(book.asks.len(), depth);
        prop_assert!(book.validate().is_ok());
        prop_assert!(book
            .bids
            .iter()
            .chain(&book.asks)
            .all(|l| l.price > Decimal::ZERO && l.amount.as_decimal() > Decimal::ZERO));
        if let Some(quoted) = book.quoted_spread() {
            prop_assert!((quoted - spread).abs() <= DepthConfig::DEFAULT_TICK_STEP);
        }
    }

    #[test]
    fn prop_unrounded_books_hold_invariants(
        mid_units in 1i64..1_000_000_000,
        spread_units in -1_000i64..1_000,
        tick_units in 1i64..1_000,
        depth in 0usize..80,
    ) {
        let config = DepthConfig::new(Decimal::new(tick_units, 4), None).unwrap();
        let amount = FixedAmount(Quantity::new(dec!(0.5)).unwrap());
        let mut generator = DepthBookGenerator::new(config, amount);

        let mid = Decimal::new(mid_units, 4);
        let book = generator.generate(mid, Decimal::new(spread_units, 4), depth);

        prop_assert!(book.validate().is_ok());
        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            prop_assert!(ask >= bid);
        }
    }
}
