//! Operator session: run controller, narration script, and status log.

pub mod controller;
pub mod script;
pub mod status;
