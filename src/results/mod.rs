//! Result records and their per-system aggregation.

pub mod aggregate;
pub mod model;
