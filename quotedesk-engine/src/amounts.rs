//! Amount sources for synthetic depth.
//!
//! The generator asks an [`AmountSource`] for the quantity at each level.
//! Sources return a [`Quantity`], so a zero or negative amount cannot be
//! produced in the first place.

use quotedesk_domain::{BookSide, Quantity};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{EngineError, EngineResult};

/// Supplies the quantity resting at each generated level.
pub trait AmountSource {
    /// Amount for `level` (0 = best price) on `side`.
    fn next_amount(&mut self, side: BookSide, level: usize) -> Quantity;
}

impl<F> AmountSource for F
where
    F: FnMut(BookSide, usize) -> Quantity,
{
    fn next_amount(&mut self, side: BookSide, level: usize) -> Quantity {
        self(side, level)
    }
}

// =============================================================================
// FixedAmount
// =============================================================================

/// Same amount at every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAmount(pub Quantity);

impl AmountSource for FixedAmount {
    fn next_amount(&mut self, _side: BookSide, _level: usize) -> Quantity {
        self.0
    }
}

// =============================================================================
// UniformAmounts
// =============================================================================

/// Uniformly distributed amounts on a decimal grid.
///
/// Draws integers in `[min × 10^scale, max × 10^scale)` and scales them
/// back down, so every amount has exactly `scale` decimal places.
/// Seed it for reproducible books.
#[derive(Debug, Clone)]
pub struct UniformAmounts {
    rng: StdRng,
    low_units: i64,
    high_units: i64,
    scale: u32,
}

impl UniformAmounts {
    /// Default lower bound (inclusive)
    pub const DEFAULT_MIN: Decimal = dec!(0.1);
    /// Default upper bound (exclusive)
    pub const DEFAULT_MAX: Decimal = dec!(5.1);
    /// Default decimal places
    pub const DEFAULT_SCALE: u32 = 4;

    /// Create a source over `[min, max)` with `scale` decimal places.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` if:
    /// - min <= 0
    /// - max <= min
    /// - the range is empty or unrepresentable at `scale`
    pub fn new(min: Decimal, max: Decimal, scale: u32, rng: StdRng) -> EngineResult<Self> {
        if min <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig(format!(
                "Amount minimum must be positive, got {}",
                min
            )));
        }
        if max <= min {
            return Err(EngineError::InvalidConfig(format!(
                "Amount maximum {} must exceed minimum {}",
                max, min
            )));
        }

        let low_units = to_units(min, scale)?;
        let high_units = to_units(max, scale)?;
        if low_units <= 0 || high_units <= low_units {
            return Err(EngineError::InvalidConfig(format!(
                "Amount range [{}, {}) is empty at {} decimal places",
                min, max, scale
            )));
        }

        Ok(Self {
            rng,
            low_units,
            high_units,
            scale,
        })
    }

    /// Default range with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::default_range(StdRng::seed_from_u64(seed))
    }

    /// Default range seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::default_range(StdRng::from_entropy())
    }

    fn default_range(rng: StdRng) -> Self {
        // 0.1 → 1000 units, 5.1 → 51000 units at 4 dp
        Self {
            rng,
            low_units: 1_000,
            high_units: 51_000,
            scale: Self::DEFAULT_SCALE,
        }
    }

    /// Lower bound of the range.
    pub fn min(&self) -> Decimal {
        Decimal::new(self.low_units, self.scale)
    }

    /// Upper bound of the range (exclusive).
    pub fn max(&self) -> Decimal {
        Decimal::new(self.high_units, self.scale)
    }
}

impl AmountSource for UniformAmounts {
    fn next_amount(&mut self, _side: BookSide, _level: usize) -> Quantity {
        let units = self.rng.gen_range(self.low_units..self.high_units);
        // low_units > 0, so the fallback is never taken
        Quantity::new(Decimal::new(units, self.scale)).unwrap_or(Quantity::MIN_POSITIVE)
    }
}

pub(crate) fn to_units(value: Decimal, scale: u32) -> EngineResult<i64> {
    use rust_decimal::prelude::ToPrimitive;

    let factor = Decimal::from(10_i64.checked_pow(scale).ok_or_else(|| {
        EngineError::InvalidConfig(format!("Amount scale {} is too large", scale))
    })?);

    value
        .checked_mul(factor)
        .and_then(|units| units.trunc().to_i64())
        .ok_or_else(|| EngineError::InvalidConfig(format!("Amount {} out of range", value)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_amounts_stay_in_range() {
        let mut source = UniformAmounts::seeded(7);

        for level in 0..500 {
            let amount = source.next_amount(BookSide::Bid, level).as_decimal();
            assert!(amount >= dec!(0.1), "amount {} below range", amount);
            assert!(amount < dec!(5.1), "amount {} above range", amount);
            assert!(amount.scale() <= 4);
        }
    }

    #[test]
    fn test_uniform_amounts_are_reproducible() {
        let mut a = UniformAmounts::seeded(42);
        let mut b = UniformAmounts::seeded(42);

        for level in 0..20 {
            assert_eq!(a.next_amount(BookSide::Ask, level), b.next_amount(BookSide::Ask, level));
        }
    }

    #[test]
    fn test_uniform_amounts_custom_range() {
        let source =
            UniformAmounts::new(dec!(1), dec!(2), 2, StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(source.min(), dec!(1));
        assert_eq!(source.max(), dec!(2));
    }

    #[test]
    fn test_uniform_amounts_default_bounds() {
        let source = UniformAmounts::seeded(0);

        assert_eq!(source.min(), UniformAmounts::DEFAULT_MIN);
        assert_eq!(source.max(), UniformAmounts::DEFAULT_MAX);
    }

    #[test]
    fn test_uniform_amounts_rejects_bad_ranges() {
        let rng = || StdRng::seed_from_u64(1);

        assert!(UniformAmounts::new(dec!(0), dec!(5), 4, rng()).is_err());
        assert!(UniformAmounts::new(dec!(-1), dec!(5), 4, rng()).is_err());
        assert!(UniformAmounts::new(dec!(5), dec!(5), 4, rng()).is_err());
        // Collapses to an empty range at 1 dp
        assert!(UniformAmounts::new(dec!(0.01), dec!(0.02), 1, rng()).is_err());
    }

    #[test]
    fn test_fixed_amount() {
        let qty = Quantity::new(dec!(1.5)).unwrap();
        let mut source = FixedAmount(qty);

        assert_eq!(source.next_amount(BookSide::Bid, 0), qty);
        assert_eq!(source.next_amount(BookSide::Ask, 99), qty);
    }

    #[test]
    fn test_closure_source() {
        let mut source = |_side: BookSide, level: usize| {
            Quantity::new(Decimal::from(level as u64 + 1)).unwrap()
        };

        assert_eq!(source.next_amount(BookSide::Bid, 2).as_decimal(), dec!(3));
    }
}
