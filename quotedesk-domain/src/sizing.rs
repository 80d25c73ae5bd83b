//! Position Sizing Types
//!
//! Inputs and outputs of the risk-based position size calculator.
//!
//! ```text
//! Position Size = Risk Amount / |Entry - Stop|
//! ```
//!
//! The position is always sized so that a stop-out loses exactly the
//! risk amount, whatever the distance between entry and stop.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{parse_decimal, DomainError, Price, Quantity, Side};

// =============================================================================
// PositionInputs
// =============================================================================

/// The four numbers a trader enters into the calculator
///
/// # Invariants
/// - All prices are > 0
/// - Risk amount is > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInputs {
    /// Planned entry price
    pub entry_price: Price,
    /// Stop-loss price
    pub stop_loss: Price,
    /// Take-profit price
    pub take_profit: Price,
    /// Currency amount lost if the stop is hit
    risk_amount: Decimal,
}

impl PositionInputs {
    /// Create validated inputs
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPrice` for a non-positive price and
    /// `DomainError::InvalidRiskAmount` for a non-positive risk amount
    pub fn new(
        entry_price: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
        risk_amount: Decimal,
    ) -> Result<Self, DomainError> {
        if risk_amount <= Decimal::ZERO {
            return Err(DomainError::InvalidRiskAmount("Risk amount must be positive".to_string()));
        }

        Ok(Self {
            entry_price: Price::new(entry_price)?,
            stop_loss: Price::new(stop_loss)?,
            take_profit: Price::new(take_profit)?,
            risk_amount,
        })
    }

    /// Read inputs from form text
    ///
    /// Missing, non-numeric, zero or negative fields all mean there is
    /// not enough input to size a position, so this returns `None`
    /// rather than an error.
    ///
    /// # Examples
    /// ```
    /// # use quotedesk_domain::sizing::PositionInputs;
    /// assert!(PositionInputs::parse("67840", "67000", "69500", "1000").is_some());
    /// assert!(PositionInputs::parse("67840", "", "69500", "1000").is_none());
    /// assert!(PositionInputs::parse("67840", "67000", "69500", "0").is_none());
    /// ```
    pub fn parse(entry: &str, stop: &str, target: &str, risk: &str) -> Option<Self> {
        let entry = parse_decimal(entry).ok()?;
        let stop = parse_decimal(stop).ok()?;
        let target = parse_decimal(target).ok()?;
        let risk = parse_decimal(risk).ok()?;
        Self::new(entry, stop, target, risk).ok()
    }

    /// Build inputs from floats, rejecting NaN, infinities and non-positive values
    pub fn from_f64(entry: f64, stop: f64, target: f64, risk: f64) -> Option<Self> {
        Self::new(
            Decimal::from_f64(entry)?,
            Decimal::from_f64(stop)?,
            Decimal::from_f64(target)?,
            Decimal::from_f64(risk)?,
        )
        .ok()
    }

    /// Get the risk amount
    pub fn risk_amount(&self) -> Decimal {
        self.risk_amount
    }

    /// Loss per unit if the stop is hit: |entry - stop|
    pub fn risk_per_unit(&self) -> Decimal {
        (self.entry_price.as_decimal() - self.stop_loss.as_decimal()).abs()
    }

    /// Gain per unit if the target is hit: |target - entry|
    pub fn reward_per_unit(&self) -> Decimal {
        (self.take_profit.as_decimal() - self.entry_price.as_decimal()).abs()
    }

    /// Trade direction implied by the stop placement
    pub fn direction(&self) -> Option<Side> {
        Side::from_entry_and_stop(self.entry_price, self.stop_loss)
    }
}

// =============================================================================
// RiskReward
// =============================================================================

/// Reward per unit divided by risk per unit
///
/// Displayed the way traders quote it: `1 : 1.98`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiskReward(Decimal);

impl RiskReward {
    /// Wrap a ratio
    pub fn new(ratio: Decimal) -> Self {
        Self(ratio)
    }

    /// Get the underlying ratio
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for RiskReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ratio = self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "1 : {:.2}", ratio)
    }
}

// =============================================================================
// PositionResult
// =============================================================================

/// Output of the position size calculator
///
/// Always produced whole from a full set of inputs; there is no partially
/// filled result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionResult {
    /// Inputs this result was computed from
    pub inputs: PositionInputs,
    /// |entry - stop|
    pub risk_per_unit: Decimal,
    /// |target - entry|
    pub reward_per_unit: Decimal,
    /// Units to trade so a stop-out loses exactly the risk amount
    pub position_size: Quantity,
    /// Reward per unit over risk per unit
    pub risk_reward: RiskReward,
    /// Gain if the target is hit
    pub potential_profit: Decimal,
    /// Loss if the stop is hit (equals the risk amount)
    pub potential_loss: Decimal,
}

impl PositionResult {
    /// Trade direction implied by the stop placement
    pub fn direction(&self) -> Option<Side> {
        self.inputs.direction()
    }

    /// Notional value of the position: size × entry price
    pub fn notional_value(&self) -> Decimal {
        self.position_size.as_decimal() * self.inputs.entry_price.as_decimal()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_inputs_validation() {
        assert!(PositionInputs::new(dec!(100), dec!(95), dec!(110), dec!(50)).is_ok());

        let err = PositionInputs::new(dec!(100), dec!(95), dec!(110), dec!(0)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRiskAmount(_)));

        let err = PositionInputs::new(dec!(0), dec!(95), dec!(110), dec!(50)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPrice(_)));

        assert!(PositionInputs::new(dec!(100), dec!(-5), dec!(110), dec!(50)).is_err());
    }

    #[test]
    fn test_inputs_parse_insufficient() {
        assert!(PositionInputs::parse("", "67000", "69500", "1000").is_none());
        assert!(PositionInputs::parse("67840", "abc", "69500", "1000").is_none());
        assert!(PositionInputs::parse("67840", "67000", "0", "1000").is_none());
        assert!(PositionInputs::parse("67840", "67000", "69500", "-1").is_none());
    }

    #[test]
    fn test_inputs_parse_valid() {
        let inputs = PositionInputs::parse("67840", "67000", "69500", "1000").unwrap();
        assert_eq!(inputs.entry_price.as_decimal(), dec!(67840));
        assert_eq!(inputs.stop_loss.as_decimal(), dec!(67000));
        assert_eq!(inputs.take_profit.as_decimal(), dec!(69500));
        assert_eq!(inputs.risk_amount(), dec!(1000));
    }

    #[test]
    fn test_inputs_from_f64() {
        assert!(PositionInputs::from_f64(100.0, 95.0, 110.0, 50.0).is_some());
        assert!(PositionInputs::from_f64(f64::NAN, 95.0, 110.0, 50.0).is_none());
        assert!(PositionInputs::from_f64(100.0, 95.0, f64::INFINITY, 50.0).is_none());
    }

    #[test]
    fn test_per_unit_distances_are_absolute() {
        // Short setup: stop above entry, target below
        let inputs = PositionInputs::new(dec!(100), dec!(104), dec!(90), dec!(20)).unwrap();
        assert_eq!(inputs.risk_per_unit(), dec!(4));
        assert_eq!(inputs.reward_per_unit(), dec!(10));
        assert_eq!(inputs.direction(), Some(Side::Short));
    }

    #[test]
    fn test_risk_reward_display() {
        assert_eq!(RiskReward::new(dec!(1.97619)).to_string(), "1 : 1.98");
        assert_eq!(RiskReward::new(dec!(2)).to_string(), "1 : 2.00");
    }
}
