//! Inter-task communication channels
//!
//! The ranging channels are created once at startup and lent to each task
//! by `'static` reference. Uses embassy-sync primitives for safe async
//! communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use static_cell::StaticCell;

use echorange_core::ranging::{EdgeCapture, RangingChannels, EDGE_QUEUE_DEPTH};

/// Channels shared between executors, so guarded by critical sections
pub type Channels = RangingChannels<CriticalSectionRawMutex>;

/// Edge timestamp producer owned by the capture task
pub type EdgeCaptureHandle = EdgeCapture<'static, CriticalSectionRawMutex, EDGE_QUEUE_DEPTH>;

static CHANNELS: StaticCell<Channels> = StaticCell::new();
static EDGE_CAPTURE: StaticCell<EdgeCaptureHandle> = StaticCell::new();

/// Create the channels and the edge producer feeding them
///
/// Panics if called twice.
pub fn init() -> (&'static Channels, &'static EdgeCaptureHandle) {
    let channels: &'static Channels = CHANNELS.init(RangingChannels::new());
    let capture: &'static EdgeCaptureHandle =
        EDGE_CAPTURE.init(EdgeCapture::new(channels.edges.sender()));
    (channels, capture)
}
