//! Periodic range trigger
//!
//! Emits the sensor trigger pulse on a fixed cadence and posts the
//! readiness gate after each pulse.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{block_for, Ticker};
use embedded_hal::digital::OutputPin;

use super::gate::ReadinessGate;
use crate::config::TriggerConfig;

/// Trigger line driver
pub struct RangeTrigger<'a, M: RawMutex, P: OutputPin> {
    pin: P,
    ready: &'a ReadinessGate<M>,
    config: TriggerConfig,
}

impl<'a, M: RawMutex, P: OutputPin> RangeTrigger<'a, M, P> {
    /// Create a trigger driver, leaving the line low
    pub fn new(mut pin: P, ready: &'a ReadinessGate<M>, config: TriggerConfig) -> Self {
        if pin.set_low().is_err() {
            warn!("Trigger line could not be driven low");
        }
        Self { pin, ready, config }
    }

    /// Emit one trigger pulse and post the readiness gate
    ///
    /// The pulse is a busy wait: it is only a few microseconds and must not
    /// be stretched by other tasks. If the line cannot be driven, the gate
    /// is left alone so the display falls through to its timeout.
    pub fn fire(&mut self) -> Result<(), P::Error> {
        if let Err(e) = self.pulse() {
            let _ = self.pin.set_low();
            return Err(e);
        }
        self.ready.post();
        Ok(())
    }

    fn pulse(&mut self) -> Result<(), P::Error> {
        self.pin.set_high()?;
        block_for(self.config.pulse_width());
        self.pin.set_low()
    }

    /// Trigger forever at the configured period
    pub async fn run(&mut self) -> ! {
        info!(
            "Range trigger running: period={}ms, pulse={}us",
            self.config.period_ms,
            self.config.pulse_width_us
        );

        let mut ticker = Ticker::every(self.config.period());
        loop {
            match self.fire() {
                Ok(()) => trace!("Trigger pulse sent"),
                Err(_) => warn!("Trigger pulse failed, cycle skipped"),
            }
            ticker.next().await;
        }
    }
}
