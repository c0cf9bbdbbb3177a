//! Ranging configuration
//!
//! `build.rs` validates `ranging.toml` and compiles it into the `RANGING`
//! constant. Edit ranging.toml and rebuild to customize.

use defmt::*;
use echorange_core::config::{DisplayConfig, EchoConfig, RangingConfig, TriggerConfig};

include!(concat!(env!("OUT_DIR"), "/ranging_config.rs"));

/// Check the compiled-in configuration, falling back to defaults
pub fn load() -> RangingConfig {
    match RANGING.validate() {
        Ok(()) => {
            info!(
                "Ranging config: period={}ms, max pulse={}us, range={}cm",
                RANGING.trigger.period_ms,
                RANGING.echo.max_pulse_width_us,
                RANGING.display.max_range_cm
            );
            RANGING
        }
        Err(e) => {
            // build.rs applies the same checks, so this only trips if the two drift
            error!("Invalid ranging config: {}", e);
            error!("Using built-in defaults");
            RangingConfig::DEFAULT
        }
    }
}
