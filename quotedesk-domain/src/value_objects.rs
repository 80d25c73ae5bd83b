//! Value Objects for the Quotedesk Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Price must be positive
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Quantity must be positive
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Risk budget must be positive
    #[error("Invalid risk amount: {0}")]
    InvalidRiskAmount(String),

    /// Text could not be read as a decimal number
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// A generated depth ladder broke an ordering or positivity invariant
    #[error("Invalid depth: {0}")]
    InvalidDepth(String),
}

/// Parse user-entered text into a decimal.
///
/// Accepts plain (`67840.5`) and scientific (`6.784e4`) notation,
/// ignoring surrounding whitespace.
///
/// # Errors
/// Returns `DomainError::InvalidNumber` for empty or non-numeric text
pub fn parse_decimal(text: &str) -> Result<Decimal, DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidNumber("empty input".to_string()));
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| DomainError::InvalidNumber(format!("not a number: {}", trimmed)))
}

// =============================================================================
// Price
// =============================================================================

/// Price represents a positive decimal price
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    /// Create a new Price with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPrice` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidPrice("Price must be positive".to_string()));
        }
        Ok(Self(value))
    }

    /// Parse a price from user-entered text
    ///
    /// # Examples
    /// ```
    /// # use quotedesk_domain::value_objects::Price;
    /// # use rust_decimal_macros::dec;
    /// assert_eq!(Price::parse(" 67840 ").unwrap().as_decimal(), dec!(67840));
    /// assert!(Price::parse("abc").is_err());
    /// assert!(Price::parse("0").is_err());
    /// ```
    ///
    /// # Errors
    /// Returns `DomainError::InvalidNumber` for non-numeric text and
    /// `DomainError::InvalidPrice` for zero or negative values
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        Self::new(parse_decimal(text)?)
    }

    /// Create a Price from a float
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPrice` for NaN, infinities and values <= 0
    pub fn from_f64(value: f64) -> Result<Self, DomainError> {
        let decimal = Decimal::from_f64(value)
            .ok_or_else(|| DomainError::InvalidPrice(format!("Not a finite number: {}", value)))?;
        Self::new(decimal)
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// Quantity represents a positive decimal quantity
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Smallest representable positive quantity (1e-28)
    pub const MIN_POSITIVE: Quantity = Quantity(Decimal::from_parts(1, 0, 0, false, 28));

    /// Create a new Quantity with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidQuantity` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidQuantity("Quantity must be positive".to_string()));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Side
// =============================================================================

/// Side represents the trade direction implied by a stop placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Long position (stop below entry)
    Long,
    /// Short position (stop above entry)
    Short,
}

impl Side {
    /// Infer the direction from entry and stop prices
    ///
    /// Stop below entry → Long, stop above entry → Short.
    /// Returns `None` when the stop sits on the entry price.
    pub fn from_entry_and_stop(entry: Price, stop: Price) -> Option<Self> {
        match stop.cmp(&entry) {
            std::cmp::Ordering::Less => Some(Side::Long),
            std::cmp::Ordering::Greater => Some(Side::Short),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

// =============================================================================
// BookSide
// =============================================================================

/// BookSide identifies one half of an order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookSide {
    /// Buy orders, best (highest) price first
    Bid,
    /// Sell orders, best (lowest) price first
    Ask,
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookSide::Bid => write!(f, "BID"),
            BookSide::Ask => write!(f, "ASK"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
