//! Readiness gate
//!
//! Single-slot signal posted by the trigger task once per cycle and
//! consumed by the display task. Posting an already-set gate is a no-op,
//! so missed cycles never pile up.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration, TimeoutError};

/// Binary readiness token
pub struct ReadinessGate<M: RawMutex> {
    signal: Signal<M, ()>,
}

impl<M: RawMutex> ReadinessGate<M> {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Mark a trigger cycle as complete (never blocks)
    pub fn post(&self) {
        self.signal.signal(());
    }

    /// Wait for the gate and consume it
    pub async fn wait(&self, timeout: Duration) -> Result<(), TimeoutError> {
        with_timeout(timeout, self.signal.wait()).await
    }

    /// Check whether a post is pending without consuming it
    #[cfg(test)]
    pub(crate) fn is_posted(&self) -> bool {
        self.signal.signaled()
    }
}

impl<M: RawMutex> Default for ReadinessGate<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_time::Instant;

    const SHORT: Duration = Duration::from_millis(20);

    #[test]
    fn test_wait_times_out_without_post() {
        let gate: ReadinessGate<CriticalSectionRawMutex> = ReadinessGate::new();
        let start = Instant::now();
        assert!(block_on(gate.wait(SHORT)).is_err());
        assert!(start.elapsed() >= SHORT);
    }

    #[test]
    fn test_post_then_wait() {
        let gate: ReadinessGate<CriticalSectionRawMutex> = ReadinessGate::new();
        gate.post();
        assert!(gate.is_posted());
        assert!(block_on(gate.wait(SHORT)).is_ok());
        assert!(!gate.is_posted());
    }

    #[test]
    fn test_double_post_consumed_once() {
        let gate: ReadinessGate<CriticalSectionRawMutex> = ReadinessGate::new();
        gate.post();
        gate.post();

        assert!(block_on(gate.wait(SHORT)).is_ok());
        assert!(block_on(gate.wait(SHORT)).is_err());
    }
}
