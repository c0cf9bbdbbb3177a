//! Pulse width to distance conversion

/// Speed of sound at room temperature (cm/µs)
pub const SPEED_OF_SOUND_CM_PER_US: f64 = 0.0343;

/// Distance channel capacity; a sample is "the latest", not history
pub const SAMPLE_QUEUE_DEPTH: usize = 1;

/// A single distance reading
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DistanceSample {
    centimeters: f32,
}

impl DistanceSample {
    /// Convert an echo pulse width to a distance
    ///
    /// The pulse covers the round trip, so only half of it counts.
    pub fn from_pulse_width_us(width_us: u32) -> Self {
        let centimeters = width_us as f64 * SPEED_OF_SOUND_CM_PER_US / 2.0;
        Self {
            centimeters: centimeters as f32,
        }
    }

    pub const fn from_centimeters(centimeters: f32) -> Self {
        Self { centimeters }
    }

    pub fn centimeters(&self) -> f32 {
        self.centimeters
    }

    /// Check whether the reading is strictly inside `max_range_cm`
    pub fn is_within(&self, max_range_cm: f32) -> bool {
        self.centimeters < max_range_cm
    }
}
