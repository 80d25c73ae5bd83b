//! Test helpers for Quotedesk tests.
//!
//! Provides decimal tolerance assertions, ladder invariant checks and
//! fixtures for the reference sizing and depth scenarios.

mod helpers;

pub use helpers::{
    assert_approx_eq, assert_book_invariants, ladder_prices, reference_inputs, DepthScenario,
    DEFAULT_TOLERANCE, REFERENCE_DEPTH,
};
