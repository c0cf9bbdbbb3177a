//! Board-agnostic ranging pipeline for the Echorange firmware
//!
//! This crate contains everything between the echo pin and the display
//! that does not depend on a specific chip:
//!
//! - Edge capture (interrupt-side producer)
//! - Echo pulse pairing and distance conversion
//! - Periodic trigger with a readiness gate
//! - Display synchronization and frame composition
//! - Configuration type definitions
//! - Display collaborator trait
//!
//! Tasks communicate only through [`ranging::RangingChannels`], which the
//! firmware constructs once and lends to every task.

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod ranging;
pub mod traits;
