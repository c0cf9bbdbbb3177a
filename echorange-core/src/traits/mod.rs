//! Hardware abstraction traits
//!
//! These traits define the interface between the ranging pipeline
//! and hardware-specific implementations.

pub mod display;

pub use display::{DisplayError, RangeDisplay};
