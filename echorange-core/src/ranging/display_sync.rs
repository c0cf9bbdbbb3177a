//! Display synchronization
//!
//! Waits for the trigger's readiness gate, then for a distance sample,
//! and renders whatever it got. Each wait is bounded, and a missed wait is
//! rendered as a failure frame instead of stalling the display.

use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;
use embassy_time::with_timeout;
use heapless::String;

use super::distance::DistanceSample;
use super::gate::ReadinessGate;
use crate::config::DisplayConfig;
use crate::traits::{DisplayError, RangeDisplay};

/// Text shown whenever no valid distance is available
pub const FAILURE_TEXT: &str = "Failure";

/// Frame text capacity
pub const FRAME_TEXT_LEN: usize = 32;

/// What one display cycle received
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// A distance sample arrived
    Sample(DistanceSample),
    /// Trigger completed but no sample arrived in time
    NoSample,
    /// No trigger cycle completed in time
    NoTrigger,
}

/// Bar length in pixels for a distance, clipped to `width`
pub fn bar_length(distance_cm: f32, max_range_cm: f32, width: u16) -> u16 {
    if distance_cm.is_nan() || distance_cm <= 0.0 {
        return 0;
    }
    let scaled = distance_cm / max_range_cm * width as f32;
    if scaled >= width as f32 {
        width
    } else {
        scaled as u16
    }
}

/// A composed display frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    text: String<FRAME_TEXT_LEN>,
    bar_len: Option<u16>,
}

impl Frame {
    /// Failure frame with no bar
    pub fn failure() -> Self {
        let mut text = String::new();
        let _ = text.push_str(FAILURE_TEXT);
        Self {
            text,
            bar_len: None,
        }
    }

    /// Build the frame for a reading
    ///
    /// Samples at or beyond the range limit keep their (clipped) bar but
    /// show the failure text.
    pub fn compose(reading: Reading, config: &DisplayConfig, width: u16) -> Self {
        let sample = match reading {
            Reading::Sample(sample) => sample,
            Reading::NoSample | Reading::NoTrigger => return Self::failure(),
        };

        let cm = sample.centimeters();
        let mut frame = Self::failure();
        frame.bar_len = Some(bar_length(cm, config.max_range_cm, width));

        if sample.is_within(config.max_range_cm) {
            frame.text.clear();
            if write!(frame.text, "Distance: {:.2} cm", cm).is_err() {
                return Self::failure();
            }
        }

        frame
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn bar_len(&self) -> Option<u16> {
        self.bar_len
    }

    /// Draw the frame and push it to the panel
    pub async fn render<D: RangeDisplay>(
        &self,
        display: &mut D,
        config: &DisplayConfig,
    ) -> Result<(), DisplayError> {
        display.clear()?;
        display.draw_text(0, 0, config.text_scale, self.text.as_str())?;

        if let Some(len) = self.bar_len.filter(|len| *len > 0) {
            display.draw_line(0, config.bar_y, len as i32 - 1, config.bar_y)?;
        }

        display.present().await
    }
}

/// Display task state
pub struct DisplaySync<'a, M: RawMutex, D: RangeDisplay, const S: usize> {
    ready: &'a ReadinessGate<M>,
    samples: Receiver<'a, M, DistanceSample, S>,
    display: D,
    config: DisplayConfig,
}

impl<'a, M: RawMutex, D: RangeDisplay, const S: usize> DisplaySync<'a, M, D, S> {
    pub fn new(
        ready: &'a ReadinessGate<M>,
        samples: Receiver<'a, M, DistanceSample, S>,
        display: D,
        config: DisplayConfig,
    ) -> Self {
        Self {
            ready,
            samples,
            display,
            config,
        }
    }

    #[cfg(test)]
    pub(crate) fn display(&self) -> &D {
        &self.display
    }

    /// Wait for the next trigger cycle and its sample
    pub async fn next_reading(&mut self) -> Reading {
        if self.ready.wait(self.config.readiness_timeout()).await.is_err() {
            return Reading::NoTrigger;
        }

        match with_timeout(self.config.sample_timeout(), self.samples.receive()).await {
            Ok(sample) => Reading::Sample(sample),
            Err(_) => Reading::NoSample,
        }
    }

    /// Run one display cycle
    pub async fn step(&mut self) -> Result<Reading, DisplayError> {
        let reading = self.next_reading().await;
        let frame = Frame::compose(reading, &self.config, self.display.width());
        frame.render(&mut self.display, &self.config).await?;
        Ok(reading)
    }

    /// Update the display forever
    pub async fn run(&mut self) -> ! {
        info!(
            "Display sync running: range={}cm, width={}px",
            self.config.max_range_cm,
            self.display.width()
        );

        loop {
            match self.step().await {
                Ok(Reading::Sample(sample)) => trace!("Displayed {} cm", sample.centimeters()),
                Ok(Reading::NoSample) => debug!("No distance sample after trigger"),
                Ok(Reading::NoTrigger) => debug!("No trigger cycle within timeout"),
                Err(e) => warn!("Display update failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranging::distance::SAMPLE_QUEUE_DEPTH;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::channel::Channel;
    use embassy_time::{Duration, Instant};
    use heapless::Vec;

    const WIDTH: u16 = 128;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Text(String<FRAME_TEXT_LEN>),
        Line(i32, i32, i32, i32),
        Present,
    }

    #[derive(Default)]
    struct RecordingDisplay {
        ops: Vec<Op, 16>,
        fail_present: bool,
    }

    impl RangeDisplay for RecordingDisplay {
        fn clear(&mut self) -> Result<(), DisplayError> {
            self.ops.clear();
            let _ = self.ops.push(Op::Clear);
            Ok(())
        }

        fn draw_text(&mut self, _x: i32, _y: i32, _scale: u8, text: &str) -> Result<(), DisplayError> {
            let mut s = String::new();
            let _ = s.push_str(text);
            let _ = self.ops.push(Op::Text(s));
            Ok(())
        }

        fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<(), DisplayError> {
            let _ = self.ops.push(Op::Line(x0, y0, x1, y1));
            Ok(())
        }

        async fn present(&mut self) -> Result<(), DisplayError> {
            if self.fail_present {
                return Err(DisplayError::Communication);
            }
            let _ = self.ops.push(Op::Present);
            Ok(())
        }

        fn width(&self) -> u16 {
            WIDTH
        }
    }

    impl RecordingDisplay {
        fn text(&self) -> Option<&str> {
            self.ops.iter().find_map(|op| match op {
                Op::Text(s) => Some(s.as_str()),
                _ => None,
            })
        }

        fn line(&self) -> Option<(i32, i32, i32, i32)> {
            self.ops.iter().find_map(|op| match *op {
                Op::Line(x0, y0, x1, y1) => Some((x0, y0, x1, y1)),
                _ => None,
            })
        }
    }

    type Samples = Channel<CriticalSectionRawMutex, DistanceSample, SAMPLE_QUEUE_DEPTH>;

    fn fast_config() -> DisplayConfig {
        DisplayConfig {
            readiness_timeout_ms: 20,
            sample_timeout_ms: 20,
            ..DisplayConfig::DEFAULT
        }
    }

    fn compose_cm(cm: f32) -> Frame {
        Frame::compose(
            Reading::Sample(DistanceSample::from_centimeters(cm)),
            &DisplayConfig::DEFAULT,
            WIDTH,
        )
    }

    #[test]
    fn test_bar_length_scaling() {
        assert_eq!(bar_length(0.0, 300.0, 128), 0);
        assert_eq!(bar_length(150.0, 300.0, 128), 64);
        assert_eq!(bar_length(123.5, 300.0, 128), 52);
        assert_eq!(bar_length(300.0, 300.0, 128), 128);
        assert_eq!(bar_length(5000.0, 300.0, 128), 128);
        assert_eq!(bar_length(-3.0, 300.0, 128), 0);
        assert_eq!(bar_length(f32::NAN, 300.0, 128), 0);
    }

    #[test]
    fn test_compose_in_range() {
        let frame = compose_cm(123.5);
        assert_eq!(frame.text(), "Distance: 123.50 cm");
        assert_eq!(frame.bar_len(), Some(52));
    }

    #[test]
    fn test_compose_from_pulse() {
        let frame = Frame::compose(
            Reading::Sample(DistanceSample::from_pulse_width_us(800)),
            &DisplayConfig::DEFAULT,
            WIDTH,
        );
        assert_eq!(frame.text(), "Distance: 13.72 cm");
    }

    #[test]
    fn test_compose_range_boundary() {
        // Exactly at the limit counts as out of range
        let frame = compose_cm(300.0);
        assert_eq!(frame.text(), FAILURE_TEXT);
        assert_eq!(frame.bar_len(), Some(WIDTH));

        let frame = Frame::compose(
            Reading::Sample(DistanceSample::from_pulse_width_us(17_493)),
            &DisplayConfig::DEFAULT,
            WIDTH,
        );
        assert_eq!(frame.text(), FAILURE_TEXT);

        let frame = Frame::compose(
            Reading::Sample(DistanceSample::from_pulse_width_us(17_492)),
            &DisplayConfig::DEFAULT,
            WIDTH,
        );
        assert_eq!(frame.text(), "Distance: 299.99 cm");
        assert_eq!(frame.bar_len(), Some(WIDTH - 1));
    }

    #[test]
    fn test_compose_out_of_range_clips_bar() {
        let frame = compose_cm(450.0);
        assert_eq!(frame.text(), FAILURE_TEXT);
        assert_eq!(frame.bar_len(), Some(WIDTH));
    }

    #[test]
    fn test_compose_missing_readings() {
        for reading in [Reading::NoSample, Reading::NoTrigger] {
            let frame = Frame::compose(reading, &DisplayConfig::DEFAULT, WIDTH);
            assert_eq!(frame, Frame::failure());
            assert_eq!(frame.bar_len(), None);
        }
    }

    #[test]
    fn test_render_draws_text_bar_then_presents() {
        let mut display = RecordingDisplay::default();
        block_on(compose_cm(150.0).render(&mut display, &DisplayConfig::DEFAULT)).unwrap();

        assert_eq!(display.ops.first(), Some(&Op::Clear));
        assert_eq!(display.text(), Some("Distance: 150.00 cm"));
        assert_eq!(display.line(), Some((0, 27, 63, 27)));
        assert_eq!(display.ops.last(), Some(&Op::Present));
    }

    #[test]
    fn test_render_zero_bar_draws_no_line() {
        let mut display = RecordingDisplay::default();
        block_on(compose_cm(0.1).render(&mut display, &DisplayConfig::DEFAULT)).unwrap();
        assert_eq!(display.line(), None);
        assert_eq!(display.ops.last(), Some(&Op::Present));
    }

    #[test]
    fn test_no_trigger_renders_failure_within_timeout() {
        let samples = Samples::new();
        let gate: ReadinessGate<CriticalSectionRawMutex> = ReadinessGate::new();
        // A sample is waiting, but without a trigger it must not be consumed
        samples.try_send(DistanceSample::from_centimeters(50.0)).unwrap();

        let mut sync = DisplaySync::new(&gate, samples.receiver(), RecordingDisplay::default(), fast_config());

        let start = Instant::now();
        assert_eq!(block_on(sync.step()), Ok(Reading::NoTrigger));
        assert!(start.elapsed() < Duration::from_millis(500));

        assert_eq!(sync.display().text(), Some(FAILURE_TEXT));
        assert_eq!(sync.display().line(), None);
        assert!(samples.try_receive().is_ok());
    }

    #[test]
    fn test_trigger_without_sample_renders_failure() {
        let samples = Samples::new();
        let gate: ReadinessGate<CriticalSectionRawMutex> = ReadinessGate::new();
        let mut sync = DisplaySync::new(&gate, samples.receiver(), RecordingDisplay::default(), fast_config());

        gate.post();
        assert_eq!(block_on(sync.step()), Ok(Reading::NoSample));
        assert_eq!(sync.display().text(), Some(FAILURE_TEXT));
        assert_eq!(sync.display().line(), None);
    }

    #[test]
    fn test_trigger_with_sample_renders_distance() {
        let samples = Samples::new();
        let gate: ReadinessGate<CriticalSectionRawMutex> = ReadinessGate::new();
        let mut sync = DisplaySync::new(&gate, samples.receiver(), RecordingDisplay::default(), fast_config());

        gate.post();
        samples.try_send(DistanceSample::from_centimeters(75.0)).unwrap();

        assert_eq!(
            block_on(sync.step()),
            Ok(Reading::Sample(DistanceSample::from_centimeters(75.0)))
        );
        assert_eq!(sync.display().text(), Some("Distance: 75.00 cm"));
        assert_eq!(sync.display().line(), Some((0, 27, 31, 27)));
    }

    #[test]
    fn test_double_post_processed_once() {
        let samples = Samples::new();
        let gate: ReadinessGate<CriticalSectionRawMutex> = ReadinessGate::new();
        let mut sync = DisplaySync::new(&gate, samples.receiver(), RecordingDisplay::default(), fast_config());

        gate.post();
        gate.post();
        samples.try_send(DistanceSample::from_centimeters(20.0)).unwrap();

        assert!(matches!(block_on(sync.step()), Ok(Reading::Sample(_))));
        assert_eq!(block_on(sync.step()), Ok(Reading::NoTrigger));
    }

    #[test]
    fn test_present_failure_is_reported() {
        let samples = Samples::new();
        let gate: ReadinessGate<CriticalSectionRawMutex> = ReadinessGate::new();
        let display = RecordingDisplay {
            fail_present: true,
            ..Default::default()
        };
        let mut sync = DisplaySync::new(&gate, samples.receiver(), display, fast_config());

        assert_eq!(block_on(sync.step()), Err(DisplayError::Communication));
        // Next cycle still runs
        assert_eq!(block_on(sync.step()), Err(DisplayError::Communication));
    }
}
