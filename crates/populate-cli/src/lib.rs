//! CLI library components for the model populator.

pub mod logging;
