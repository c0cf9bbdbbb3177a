//! Echo edge capture task
//!
//! Timestamps every transition of the echo line. Spawned on the
//! interrupt-priority executor so a busy thread-mode task cannot delay
//! the timestamp.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Instant;

use crate::channels::EdgeCaptureHandle;

#[embassy_executor::task]
pub async fn edge_capture_task(mut echo: Input<'static>, capture: &'static EdgeCaptureHandle) {
    info!("Edge capture task started");

    loop {
        echo.wait_for_any_edge().await;

        if !capture.on_edge(Instant::now().as_micros()) {
            trace!("Edge queue full, edge dropped");
        }
    }
}
