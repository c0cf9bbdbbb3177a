//! Echo processor
//!
//! Consumes edge events, pairs them into pulse widths, converts widths to
//! distances and offers each distance to the display with a bounded wait.
//! Every wait has a timeout; nothing here can stall the pipeline.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_time::{with_timeout, Duration, Instant};

use super::distance::DistanceSample;
use super::edge::EdgeEvent;
use super::pairing::{Discard, EchoPairer, PairOutcome, PairingState, TimeoutOutcome};
use crate::config::EchoConfig;

/// How often `run` logs the counters
pub const STATS_INTERVAL: Duration = Duration::from_secs(10);

/// What a single processing step did
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoStep {
    /// Edge recorded as a pulse start
    Started,
    /// Sample handed to the distance channel
    Published(DistanceSample),
    /// Sample dropped because the previous one was never consumed
    Dropped(DistanceSample),
    /// Edge completed an impossible pulse
    Discarded(Discard),
    /// No edge arrived within the receive window
    TimedOut(TimeoutOutcome),
}

/// Running counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProcessorStats {
    pub published: u32,
    pub backpressure_drops: u32,
    pub discarded: u32,
    pub timeouts: u32,
    pub stale_resets: u32,
}

/// Edge-to-distance worker
pub struct EchoProcessor<'a, M: RawMutex, const E: usize, const S: usize> {
    edges: Receiver<'a, M, EdgeEvent, E>,
    samples: Sender<'a, M, DistanceSample, S>,
    pairer: EchoPairer,
    config: EchoConfig,
    stats: ProcessorStats,
    last_report: Instant,
}

impl<'a, M: RawMutex, const E: usize, const S: usize> EchoProcessor<'a, M, E, S> {
    pub fn new(
        edges: Receiver<'a, M, EdgeEvent, E>,
        samples: Sender<'a, M, DistanceSample, S>,
        config: EchoConfig,
    ) -> Self {
        Self {
            edges,
            samples,
            pairer: EchoPairer::new(config.max_pulse_width_us, config.stale_timeout_limit),
            config,
            stats: ProcessorStats::default(),
            last_report: Instant::now(),
        }
    }

    pub fn state(&self) -> PairingState {
        self.pairer.state()
    }

    pub fn stats(&self) -> &ProcessorStats {
        &self.stats
    }

    /// Counters to log, at most once per [`STATS_INTERVAL`]
    pub fn stats_report(&mut self, now: Instant) -> Option<ProcessorStats> {
        if now.saturating_duration_since(self.last_report) < STATS_INTERVAL {
            return None;
        }
        self.last_report = now;
        Some(self.stats)
    }

    /// Wait for one edge (or the receive timeout) and act on it
    pub async fn step(&mut self) -> EchoStep {
        match with_timeout(self.config.receive_timeout(), self.edges.receive()).await {
            Ok(event) => self.handle_edge(event).await,
            Err(_) => {
                self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
                let outcome = self.pairer.on_timeout();
                match outcome {
                    TimeoutOutcome::Reset => {
                        self.stats.stale_resets = self.stats.stale_resets.wrapping_add(1);
                        debug!("Echo pairing reset after repeated timeouts");
                    }
                    TimeoutOutcome::Holding { missed } => {
                        trace!("No falling edge yet ({} timeouts)", missed);
                    }
                    TimeoutOutcome::Idle => trace!("No echo edges"),
                }
                EchoStep::TimedOut(outcome)
            }
        }
    }

    async fn handle_edge(&mut self, event: EdgeEvent) -> EchoStep {
        match self.pairer.push(event.timestamp_us) {
            PairOutcome::Started => EchoStep::Started,
            PairOutcome::Discarded(reason) => {
                self.stats.discarded = self.stats.discarded.wrapping_add(1);
                debug!("Echo pulse discarded: {}", reason);
                EchoStep::Discarded(reason)
            }
            PairOutcome::Paired { width_us } => {
                let sample = DistanceSample::from_pulse_width_us(width_us);
                self.publish(sample).await
            }
        }
    }

    async fn publish(&mut self, sample: DistanceSample) -> EchoStep {
        match with_timeout(self.config.publish_timeout(), self.samples.send(sample)).await {
            Ok(()) => {
                self.stats.published = self.stats.published.wrapping_add(1);
                trace!("Distance {} cm", sample.centimeters());
                EchoStep::Published(sample)
            }
            Err(_) => {
                self.stats.backpressure_drops = self.stats.backpressure_drops.wrapping_add(1);
                debug!(
                    "Distance sample dropped, display busy ({} total)",
                    self.stats.backpressure_drops
                );
                EchoStep::Dropped(sample)
            }
        }
    }

    /// Process edges forever
    pub async fn run(&mut self) -> ! {
        info!(
            "Echo processor running: timeout={}ms, max pulse={}us",
            self.config.receive_timeout_ms,
            self.config.max_pulse_width_us
        );

        loop {
            self.step().await;

            if let Some(stats) = self.stats_report(Instant::now()) {
                debug!("Echo stats: {}", stats);
            }
        }
    }
}
