//! Configuration type definitions
//!
//! These types describe the ranging timing and display layout. The firmware
//! generates a `RangingConfig` constant from `ranging.toml` at build time.

use embassy_time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shortest trigger pulse the HC-SR04 reliably responds to
pub const MIN_TRIGGER_PULSE_US: u32 = 10;

/// Echo pulse length reported by the HC-SR04 when nothing reflects
pub const NO_ECHO_PULSE_US: u32 = 38_000;

/// Trigger task configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriggerConfig {
    /// Time between trigger pulses (ms)
    pub period_ms: u32,
    /// Width of the trigger pulse (µs)
    pub pulse_width_us: u32,
}

impl TriggerConfig {
    pub const DEFAULT: Self = Self {
        period_ms: 100,
        pulse_width_us: MIN_TRIGGER_PULSE_US,
    };

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms as u64)
    }

    pub fn pulse_width(&self) -> Duration {
        Duration::from_micros(self.pulse_width_us as u64)
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Echo processor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EchoConfig {
    /// How long to wait for the next edge event (ms)
    pub receive_timeout_ms: u32,
    /// How long a finished sample may wait for room in the distance channel (ms)
    pub publish_timeout_ms: u32,
    /// Longest pulse accepted as a real echo (µs)
    pub max_pulse_width_us: u32,
    /// Consecutive receive timeouts tolerated while a pulse is half-paired
    pub stale_timeout_limit: u8,
}

impl EchoConfig {
    pub const DEFAULT: Self = Self {
        receive_timeout_ms: 1000,
        publish_timeout_ms: 10,
        max_pulse_width_us: NO_ECHO_PULSE_US,
        stale_timeout_limit: 3,
    };

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms as u64)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms as u64)
    }
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Display task configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// How long to wait for a trigger cycle to complete (ms)
    pub readiness_timeout_ms: u32,
    /// How long to wait for a distance sample once triggered (ms)
    pub sample_timeout_ms: u32,
    /// Readings at or beyond this distance are shown as a failure (cm)
    pub max_range_cm: f32,
    /// Text scale passed to the display (1 = small font, 2 = large font)
    pub text_scale: u8,
    /// Vertical position of the distance bar (pixels)
    pub bar_y: i32,
}

impl DisplayConfig {
    pub const DEFAULT: Self = Self {
        readiness_timeout_ms: 1000,
        sample_timeout_ms: 1000,
        max_range_cm: 300.0,
        text_scale: 1,
        bar_y: 27,
    };

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms as u64)
    }

    pub fn sample_timeout(&self) -> Duration {
        Duration::from_millis(self.sample_timeout_ms as u64)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete ranging configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangingConfig {
    pub trigger: TriggerConfig,
    pub echo: EchoConfig,
    pub display: DisplayConfig,
}

/// Reasons a configuration is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Trigger period is zero
    ZeroTriggerPeriod,
    /// Trigger pulse shorter than the sensor minimum
    TriggerPulseTooShort,
    /// Trigger pulse does not fit inside one period
    TriggerPulseExceedsPeriod,
    /// A receive or publish timeout is zero
    ZeroTimeout,
    /// Maximum pulse width is zero
    ZeroPulseLimit,
    /// Stale timeout limit is zero
    ZeroStaleLimit,
    /// Maximum range is not a positive finite number
    InvalidRange,
    /// Text scale has no matching font
    UnsupportedTextScale,
}

impl RangingConfig {
    pub const DEFAULT: Self = Self {
        trigger: TriggerConfig::DEFAULT,
        echo: EchoConfig::DEFAULT,
        display: DisplayConfig::DEFAULT,
    };

    /// Check every field against the limits the pipeline relies on
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let trigger = &self.trigger;
        if trigger.period_ms == 0 {
            return Err(ConfigError::ZeroTriggerPeriod);
        }
        if trigger.pulse_width_us < MIN_TRIGGER_PULSE_US {
            return Err(ConfigError::TriggerPulseTooShort);
        }
        if trigger.pulse_width_us as u64 >= trigger.period_ms as u64 * 1000 {
            return Err(ConfigError::TriggerPulseExceedsPeriod);
        }

        let echo = &self.echo;
        if echo.receive_timeout_ms == 0 || echo.publish_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if echo.max_pulse_width_us == 0 {
            return Err(ConfigError::ZeroPulseLimit);
        }
        if echo.stale_timeout_limit == 0 {
            return Err(ConfigError::ZeroStaleLimit);
        }

        let display = &self.display;
        if display.readiness_timeout_ms == 0 || display.sample_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if !display.max_range_cm.is_finite() || display.max_range_cm <= 0.0 {
            return Err(ConfigError::InvalidRange);
        }
        if !matches!(display.text_scale, 1 | 2) {
            return Err(ConfigError::UnsupportedTextScale);
        }

        Ok(())
    }
}
