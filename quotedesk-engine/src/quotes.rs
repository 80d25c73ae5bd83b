//! Quote sources.
//!
//! A quote source stands in for the external price feed that supplies the
//! mid price and spread the depth generator builds around. No exchange is
//! contacted; [`SyntheticQuotes`] jitters a fixed anchor price.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amounts::to_units;
use crate::error::{EngineError, EngineResult};

/// Decimal places used when sampling synthetic quotes.
const QUOTE_SCALE: u32 = 4;

/// Mid price and spread for one book refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Mid price
    pub mid_price: Decimal,
    /// Spread (price units between best bid and best ask)
    pub spread: Decimal,
}

/// Supplies the quote for each refresh.
pub trait QuoteSource {
    /// Quote for the next refresh.
    fn next_quote(&mut self) -> Quote;
}

// =============================================================================
// FixedQuote
// =============================================================================

/// Always returns the same quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedQuote(pub Quote);

impl QuoteSource for FixedQuote {
    fn next_quote(&mut self) -> Quote {
        self.0
    }
}

// =============================================================================
// SyntheticQuotes
// =============================================================================

/// Parameters for [`SyntheticQuotes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticQuoteConfig {
    /// Price the mid wanders around
    pub anchor_mid: Decimal,
    /// Full width of the mid jitter (mid stays within anchor ± jitter/2)
    pub mid_jitter: Decimal,
    /// Smallest spread (inclusive)
    pub spread_min: Decimal,
    /// Largest spread (inclusive)
    pub spread_max: Decimal,
}

impl SyntheticQuoteConfig {
    /// Check the parameters.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` if:
    /// - anchor_mid <= 0
    /// - mid_jitter < 0 or large enough to push the mid to zero
    /// - spread_min < 0 or spread_min > spread_max
    pub fn validate(&self) -> EngineResult<()> {
        if self.anchor_mid <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig(format!(
                "Anchor mid must be positive, got {}",
                self.anchor_mid
            )));
        }
        if self.mid_jitter < Decimal::ZERO || self.mid_jitter / dec!(2) >= self.anchor_mid {
            return Err(EngineError::InvalidConfig(format!(
                "Mid jitter {} must be non-negative and below twice the anchor",
                self.mid_jitter
            )));
        }
        if self.spread_min < Decimal::ZERO || self.spread_min > self.spread_max {
            return Err(EngineError::InvalidConfig(format!(
                "Spread range [{}, {}] is invalid",
                self.spread_min, self.spread_max
            )));
        }
        Ok(())
    }
}

impl Default for SyntheticQuoteConfig {
    fn default() -> Self {
        Self {
            anchor_mid: dec!(67840.25),
            mid_jitter: dec!(10),
            spread_min: dec!(0.3),
            spread_max: dec!(0.7),
        }
    }
}

/// Random quotes around an anchor price.
#[derive(Debug, Clone)]
pub struct SyntheticQuotes {
    config: SyntheticQuoteConfig,
    rng: StdRng,
    half_jitter_units: i64,
    spread_units: (i64, i64),
}

impl SyntheticQuotes {
    /// Create a quote source.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` if the config does not validate
    pub fn new(config: SyntheticQuoteConfig, rng: StdRng) -> EngineResult<Self> {
        config.validate()?;

        let half_jitter_units = to_units(config.mid_jitter / dec!(2), QUOTE_SCALE)?;
        let spread_units = (
            to_units(config.spread_min, QUOTE_SCALE)?,
            to_units(config.spread_max, QUOTE_SCALE)?,
        );

        Ok(Self {
            config,
            rng,
            half_jitter_units,
            spread_units,
        })
    }

    /// Create a quote source with a fixed seed.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfig` if the config does not validate
    pub fn seeded(config: SyntheticQuoteConfig, seed: u64) -> EngineResult<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Get the config.
    pub fn config(&self) -> &SyntheticQuoteConfig {
        &self.config
    }
}

impl QuoteSource for SyntheticQuotes {
    fn next_quote(&mut self) -> Quote {
        let offset = self
            .rng
            .gen_range(-self.half_jitter_units..=self.half_jitter_units);
        let spread = self.rng.gen_range(self.spread_units.0..=self.spread_units.1);

        Quote {
            mid_price: self.config.anchor_mid + Decimal::new(offset, QUOTE_SCALE),
            spread: Decimal::new(spread, QUOTE_SCALE),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
