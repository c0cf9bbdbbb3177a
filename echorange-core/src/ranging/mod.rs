//! Ranging pipeline
//!
//! ```text
//! echo pin ─▶ EdgeCapture ─▶ edges ─▶ EchoProcessor ─▶ samples ─▶ DisplaySync ─▶ display
//!                                                                    ▲
//! trigger pin ◀─ RangeTrigger ─────────────▶ ready ──────────────────┘
//! ```
//!
//! All cross-task traffic goes through one [`RangingChannels`] value.

pub mod display_sync;
pub mod distance;
pub mod edge;
pub mod gate;
pub mod pairing;
pub mod processor;
pub mod trigger;

pub use display_sync::{bar_length, DisplaySync, Frame, Reading, FAILURE_TEXT};
pub use distance::{DistanceSample, SAMPLE_QUEUE_DEPTH, SPEED_OF_SOUND_CM_PER_US};
pub use edge::{EdgeCapture, EdgeEvent, EDGE_QUEUE_DEPTH};
pub use gate::ReadinessGate;
pub use pairing::{Discard, EchoPairer, PairOutcome, PairingState, TimeoutOutcome};
pub use processor::{EchoProcessor, EchoStep, ProcessorStats, STATS_INTERVAL};
pub use trigger::RangeTrigger;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

/// Edge events from interrupt context to the echo processor
pub type EdgeChannel<M> = Channel<M, EdgeEvent, EDGE_QUEUE_DEPTH>;

/// Latest distance sample from the echo processor to the display
pub type SampleChannel<M> = Channel<M, DistanceSample, SAMPLE_QUEUE_DEPTH>;

/// The two channels and the readiness gate shared by the ranging tasks
///
/// Constructed once at startup; each task borrows only the ends it uses.
pub struct RangingChannels<M: RawMutex> {
    /// Edge timestamps, FIFO in capture order
    pub edges: EdgeChannel<M>,
    /// At most one unconsumed distance sample
    pub samples: SampleChannel<M>,
    /// Set once per completed trigger cycle
    pub ready: ReadinessGate<M>,
}

impl<M: RawMutex> RangingChannels<M> {
    pub const fn new() -> Self {
        Self {
            edges: Channel::new(),
            samples: Channel::new(),
            ready: ReadinessGate::new(),
        }
    }
}

impl<M: RawMutex> Default for RangingChannels<M> {
    fn default() -> Self {
        Self::new()
    }
}
