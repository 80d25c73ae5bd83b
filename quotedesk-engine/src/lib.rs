//! Quotedesk Engine Layer
//!
//! Pure computation, deterministic given its inputs and sources, no I/O.
//!
//! - [`PositionSizer`]: risk-based position size calculator
//! - [`DepthBookGenerator`]: synthetic bid/ask ladders around a mid price
//! - [`AmountSource`] / [`QuoteSource`]: injectable (and seedable) inputs
//!   for the generator and the refresh loop that drives it

#![warn(clippy::all)]

pub mod amounts;
pub mod depth;
pub mod error;
pub mod quotes;
pub mod sizer;

pub use amounts::{AmountSource, FixedAmount, UniformAmounts};
pub use depth::{DepthBookGenerator, DepthConfig};
pub use error::{EngineError, EngineResult};
pub use quotes::{FixedQuote, Quote, QuoteSource, SyntheticQuoteConfig, SyntheticQuotes};
pub use sizer::PositionSizer;
