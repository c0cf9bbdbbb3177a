//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in echorange-core:
//!
//! - Display panels (SSD1306 OLED over I2C)

#![no_std]
#![deny(unsafe_code)]

pub mod display;
