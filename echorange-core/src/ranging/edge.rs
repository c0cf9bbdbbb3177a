//! Echo edge capture
//!
//! Runs in interrupt context on every rising and falling edge of the echo
//! line. The only work done here is stamping the edge and enqueueing it:
//! no waiting, no allocation, no I/O. A full queue drops the edge.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Sender, TrySendError};
use portable_atomic::{AtomicU32, Ordering};

/// Edge event queue capacity
pub const EDGE_QUEUE_DEPTH: usize = 64;

/// A captured echo edge
///
/// Polarity is implied by order: edges alternate rise, fall, rise, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeEvent {
    /// Monotonic timestamp (µs since boot)
    pub timestamp_us: u64,
}

/// Interrupt-side producer of edge events
pub struct EdgeCapture<'a, M: RawMutex, const N: usize> {
    events: Sender<'a, M, EdgeEvent, N>,
    dropped: AtomicU32,
}

impl<'a, M: RawMutex, const N: usize> EdgeCapture<'a, M, N> {
    pub const fn new(events: Sender<'a, M, EdgeEvent, N>) -> Self {
        Self {
            events,
            dropped: AtomicU32::new(0),
        }
    }

    /// Record an edge seen at `timestamp_us`
    ///
    /// Returns `false` if the queue was full and the edge was dropped.
    pub fn on_edge(&self, timestamp_us: u64) -> bool {
        match self.events.try_send(EdgeEvent { timestamp_us }) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Number of edges dropped because the queue was full
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}
