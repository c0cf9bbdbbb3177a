//! Display task
//!
//! Renders one frame per trigger cycle on the SSD1306 OLED.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C1;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use echorange_core::ranging::{DisplaySync, SAMPLE_QUEUE_DEPTH};
use echorange_drivers::display::Ssd1306;

pub type Oled = Ssd1306<I2c<'static, I2C1, Async>>;

pub type RangeScreen = DisplaySync<'static, CriticalSectionRawMutex, Oled, SAMPLE_QUEUE_DEPTH>;

#[embassy_executor::task]
pub async fn display_task(mut screen: RangeScreen) {
    info!("Display task started");
    screen.run().await
}
