//! Metric aggregation and clinical status assessment.
//!
//! Everything in this module is a pure function of its input.

pub mod aggregator;
pub mod status;

pub use aggregator::*;
pub use status::*;
