//! Embassy async tasks
//!
//! Each task runs independently and communicates via the ranging channels.

pub mod display;
pub mod echo;
pub mod edge_capture;
pub mod trigger;

pub use display::{display_task, RangeScreen};
pub use echo::{echo_task, Processor};
pub use edge_capture::edge_capture_task;
pub use trigger::{trigger_task, Trigger};
