//! Metric merging.
//!
//! `merger` folds one raw metric source into the aggregate; `naming`
//! derives the metric name a caller registers it under.

pub mod merger;
pub mod naming;

pub use merger::*;
pub use naming::*;
