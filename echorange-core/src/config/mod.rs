//! Configuration types
//!
//! Timing and layout parameters for the ranging pipeline. Values are fixed
//! at build time; nothing here is reconfigured while the firmware runs.

pub mod types;

pub use types::*;
