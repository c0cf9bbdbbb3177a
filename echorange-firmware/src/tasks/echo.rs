//! Echo processing task
//!
//! Turns captured edges into distance samples.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use echorange_core::ranging::{EchoProcessor, EDGE_QUEUE_DEPTH, SAMPLE_QUEUE_DEPTH};

pub type Processor =
    EchoProcessor<'static, CriticalSectionRawMutex, EDGE_QUEUE_DEPTH, SAMPLE_QUEUE_DEPTH>;

#[embassy_executor::task]
pub async fn echo_task(mut processor: Processor) {
    info!("Echo task started");
    processor.run().await
}
