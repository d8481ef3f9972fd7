//! Analysis modules.
//!
//! Aggregation of review ratings and access tags into facility summaries.

pub mod aggregator;

pub use aggregator::*;
