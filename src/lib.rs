#![forbid(unsafe_code)]

//! VCC test recorder: checklist-driven recording of railway vehicle
//! control-circuit acceptance tests.
//!
//! A run moves through four stages:
//! 1. **Setup**: train set, car, and date are validated and a capture time is taken
//! 2. **Sequence**: a fixed narration script walks the consist car by car
//! 3. **Checklist**: the operator records PASS/FAIL per catalog item
//! 4. **Report**: per-system summaries are computed and the report is stored
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use vcc_test_recorder::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use vcc_test_recorder::core::config::Config;
//! use vcc_test_recorder::store::backend::{JsonFileBackend, MemoryBackend};
//! ```

pub mod prelude;

pub mod catalog;
pub mod core;
pub mod logger;
pub mod results;
pub mod session;
pub mod store;
