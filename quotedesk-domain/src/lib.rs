//! Quotedesk Domain Layer
//!
//! Pure domain types with zero I/O dependencies.
//! Contains value objects, position sizing inputs/outputs and depth ladders.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod depth;
pub mod sizing;
pub mod value_objects;

// Re-export commonly used types
pub use depth::{DepthLevel, MarketDepth, MIN_VOLUME_BAR_PCT};
pub use sizing::{PositionInputs, PositionResult, RiskReward};
pub use value_objects::{parse_decimal, BookSide, DomainError, Price, Quantity, Side};
