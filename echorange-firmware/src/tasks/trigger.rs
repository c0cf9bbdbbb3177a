//! Trigger task
//!
//! Pulses the sensor trigger line on the configured cadence.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use echorange_core::ranging::RangeTrigger;

pub type Trigger = RangeTrigger<'static, CriticalSectionRawMutex, Output<'static>>;

#[embassy_executor::task]
pub async fn trigger_task(mut trigger: Trigger) {
    info!("Trigger task started");
    trigger.run().await
}
