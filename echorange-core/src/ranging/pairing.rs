//! Rise/fall edge pairing
//!
//! Edges arrive without polarity, so pairing is a two-state flip: the first
//! edge of a pair is the rise, the second the fall. A lost edge shows up as
//! an impossible width. Such widths are discarded and the flip re-anchors,
//! so the next coherent pair is measured correctly.

/// Pairing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PairingState {
    /// Next edge starts a pulse
    AwaitingRise,
    /// Next edge ends the pulse that started at `start_us`
    AwaitingFall { start_us: u64 },
}

/// Why a candidate pulse was thrown away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Discard {
    /// Fall timestamp earlier than the rise
    Reversed,
    /// Rise and fall share a timestamp
    Zero,
    /// Width beyond the longest real echo (µs); an edge was missed
    TooLong(u64),
}

/// Result of feeding one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PairOutcome {
    /// Edge recorded as a pulse start
    Started,
    /// Edge completed a pulse
    Paired { width_us: u32 },
    /// Edge completed an impossible pulse
    Discarded(Discard),
}

/// Result of a receive timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutOutcome {
    /// Nothing was pending
    Idle,
    /// A pulse start is still held after `missed` consecutive timeouts
    Holding { missed: u8 },
    /// Too many consecutive timeouts; the pulse start was dropped
    Reset,
}

/// Pairs edge timestamps into pulse widths
#[derive(Debug, Clone)]
pub struct EchoPairer {
    state: PairingState,
    max_width_us: u32,
    stale_limit: u8,
    missed: u8,
}

impl EchoPairer {
    /// Create a pairer
    ///
    /// # Arguments
    /// - `max_width_us`: Longest pulse accepted as a real echo
    /// - `stale_limit`: Consecutive timeouts after which a held rise is dropped
    pub const fn new(max_width_us: u32, stale_limit: u8) -> Self {
        Self {
            state: PairingState::AwaitingRise,
            max_width_us,
            stale_limit,
            missed: 0,
        }
    }

    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Feed the next edge timestamp
    pub fn push(&mut self, timestamp_us: u64) -> PairOutcome {
        self.missed = 0;

        let start_us = match self.state {
            PairingState::AwaitingRise => {
                self.state = PairingState::AwaitingFall {
                    start_us: timestamp_us,
                };
                return PairOutcome::Started;
            }
            PairingState::AwaitingFall { start_us } => start_us,
        };

        match timestamp_us.checked_sub(start_us) {
            None => {
                self.state = PairingState::AwaitingRise;
                PairOutcome::Discarded(Discard::Reversed)
            }
            Some(0) => {
                self.state = PairingState::AwaitingRise;
                PairOutcome::Discarded(Discard::Zero)
            }
            Some(width) if width > self.max_width_us as u64 => {
                // The fall was lost; this edge is the next rise
                self.state = PairingState::AwaitingFall {
                    start_us: timestamp_us,
                };
                PairOutcome::Discarded(Discard::TooLong(width))
            }
            Some(width) => {
                self.state = PairingState::AwaitingRise;
                PairOutcome::Paired {
                    width_us: width as u32,
                }
            }
        }
    }

    /// Record that no edge arrived within the receive window
    pub fn on_timeout(&mut self) -> TimeoutOutcome {
        if self.state == PairingState::AwaitingRise {
            return TimeoutOutcome::Idle;
        }

        self.missed = self.missed.saturating_add(1);
        if self.missed >= self.stale_limit {
            self.state = PairingState::AwaitingRise;
            self.missed = 0;
            TimeoutOutcome::Reset
        } else {
            TimeoutOutcome::Holding {
                missed: self.missed,
            }
        }
    }
}
