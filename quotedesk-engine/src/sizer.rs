//! Risk-based position size calculator.
//!
//! **THE GOLDEN RULE**: position size is DERIVED from the stop distance.
//!
//! ```text
//! Risk Per Unit   = |Entry - Stop|
//! Reward Per Unit = |Target - Entry|
//! Position Size   = Risk Amount / Risk Per Unit
//! Risk:Reward     = Reward Per Unit / Risk Per Unit
//! Profit          = Position Size × Reward Per Unit
//! Loss            = Risk Amount
//! ```
//!
//! - Wide stop → smaller position
//! - Tight stop → larger position
//! - The loss on a stop-out stays CONSTANT at the risk amount
//!
//! Insufficient input (missing, non-numeric or zero fields, or a stop at
//! the entry price) is not an error: the calculator simply has no result.

use quotedesk_domain::{PositionInputs, PositionResult, Quantity, RiskReward};
use rust_decimal::Decimal;
use tracing::debug;

/// Stateless position size calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionSizer;

impl PositionSizer {
    /// Create a calculator.
    pub fn new() -> Self {
        Self
    }

    /// Size a position from raw decimals.
    ///
    /// # Example
    ///
    /// ```
    /// # use quotedesk_engine::PositionSizer;
    /// # use rust_decimal_macros::dec;
    /// let result = PositionSizer::new()
    ///     .calculate(dec!(67840), dec!(67000), dec!(69500), dec!(1000))
    ///     .unwrap();
    ///
    /// // Risk per unit = 840, so 1000 / 840 = 1.1904... units
    /// assert!(result.position_size.as_decimal() > dec!(1.1904));
    /// assert!(result.position_size.as_decimal() < dec!(1.1905));
    /// assert_eq!(result.potential_loss, dec!(1000));
    /// ```
    pub fn calculate(
        &self,
        entry: Decimal,
        stop: Decimal,
        target: Decimal,
        risk: Decimal,
    ) -> Option<PositionResult> {
        match PositionInputs::new(entry, stop, target, risk) {
            Ok(inputs) => self.calculate_inputs(&inputs),
            Err(e) => {
                debug!(error = %e, "Insufficient input for position sizing");
                None
            }
        }
    }

    /// Size a position from form text.
    pub fn calculate_text(
        &self,
        entry: &str,
        stop: &str,
        target: &str,
        risk: &str,
    ) -> Option<PositionResult> {
        let Some(inputs) = PositionInputs::parse(entry, stop, target, risk) else {
            debug!(entry, stop, target, risk, "Position sizing inputs did not parse");
            return None;
        };
        self.calculate_inputs(&inputs)
    }

    /// Size a position from validated inputs.
    ///
    /// Returns `None` when the stop equals the entry (zero risk per unit)
    /// or when the arithmetic would overflow.
    pub fn calculate_inputs(&self, inputs: &PositionInputs) -> Option<PositionResult> {
        let risk_per_unit = inputs.risk_per_unit();
        let reward_per_unit = inputs.reward_per_unit();
        let risk = inputs.risk_amount();

        if risk_per_unit.is_zero() {
            debug!(
                entry = %inputs.entry_price,
                stop = %inputs.stop_loss,
                "Stop equals entry, position size undefined"
            );
            return None;
        }

        let position_size = risk.checked_div(risk_per_unit)?;
        let ratio = reward_per_unit.checked_div(risk_per_unit)?;
        let potential_profit = position_size.checked_mul(reward_per_unit)?;

        // A positive risk over a positive distance can only underflow to zero
        let position_size = match Quantity::new(position_size) {
            Ok(size) => size,
            Err(e) => {
                debug!(error = %e, "Position size rounded to zero");
                return None;
            }
        };

        Some(PositionResult {
            inputs: *inputs,
            risk_per_unit,
            reward_per_unit,
            position_size,
            risk_reward: RiskReward::new(ratio),
            potential_profit,
            potential_loss: risk,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
