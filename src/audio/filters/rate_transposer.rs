use std::collections::VecDeque;

use tracing::{debug, trace_span, warn};

use super::{AudioFilter, AudioFrame};
use crate::audio::resample::{Resampler, VecBuffers};
use crate::common::errors::{ResampleError, Result};
use crate::configs::{Quality, ResamplerConfig};

/// Factor bounds used by [`RateTransposer::new`].
const DEFAULT_MIN_FACTOR: f64 = 0.1;
const DEFAULT_MAX_FACTOR: f64 = 4.0;

/// Rate transposer changes the sample rate of every frame by `factor`.
///
/// A frame of `n` samples comes back with about `n * factor` samples and
/// its overlap scaled the same way. Frame lengths are rounded against the
/// running total of input seen, so the fractions never accumulate and the
/// stream as a whole has exactly `floor(total * factor)` samples.
///
/// The resampler holds back `filter_width` input samples of lookahead, so
/// the output starts with [`RateTransposer::latency`] samples of silence
/// and stays that far behind the input. [`AudioFilter::finish`] flushes it.
pub struct RateTransposer {
    factor: f64,
    resampler: Resampler,
    /// Resampled samples not yet handed out in a frame.
    pending: VecDeque<f32>,
    primed: bool,
    /// Output owed for every input sample seen so far, `sum(len * factor)`.
    owed: f64,
    /// Output samples handed out in frames so far.
    emitted: u64,
    /// Reused output vector for the resampler.
    scratch: Vec<f32>,
}

impl RateTransposer {
    /// Low-quality filter over factors `0.1..=4.0`.
    pub fn new(factor: f64) -> Result<Self> {
        let config = ResamplerConfig::new(Quality::Low, DEFAULT_MIN_FACTOR, DEFAULT_MAX_FACTOR);
        Self::with_config(factor, &config)
    }

    pub fn with_config(factor: f64, config: &ResamplerConfig) -> Result<Self> {
        let resampler = Resampler::from_config(config)?;
        let mut transposer = Self {
            factor: 1.0,
            resampler,
            pending: VecDeque::new(),
            primed: false,
            owed: 0.0,
            emitted: 0,
            scratch: Vec::new(),
        };
        transposer.set_factor(factor)?;
        Ok(transposer)
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Change the factor for subsequent frames. History is kept, so the
    /// change is glitch-free.
    pub fn set_factor(&mut self, factor: f64) -> Result<()> {
        let (min, max) = (self.resampler.min_factor(), self.resampler.max_factor());
        if !(factor >= min && factor <= max) {
            return Err(ResampleError::FactorOutOfRange { factor, min, max });
        }
        self.factor = factor;
        Ok(())
    }

    /// Output samples the stream is delayed by after priming.
    pub fn latency(&self) -> usize {
        (self.resampler.filter_width() as f64 * self.factor).ceil() as usize + 2
    }

    /// Resampled samples produced but not yet handed out.
    pub fn backlog(&self) -> usize {
        self.pending.len()
    }

    pub fn resampler(&self) -> &Resampler {
        &self.resampler
    }

    fn run(&mut self, input: &[f32], last_batch: bool) -> Result<()> {
        let mut buffers = VecBuffers::new(input);
        buffers.output = std::mem::take(&mut self.scratch);
        buffers.output.clear();

        loop {
            let completed = self.resampler.process(self.factor, &mut buffers, last_batch)?;
            if completed || (!last_batch && buffers.input_consumed() == input.len()) {
                break;
            }
        }

        self.pending.extend(buffers.output.iter().copied());
        self.scratch = buffers.output;
        Ok(())
    }
}

impl AudioFilter for RateTransposer {
    fn process(&mut self, frame: &mut AudioFrame) -> Result<()> {
        let _span = trace_span!("rate_transposer", factor = self.factor).entered();
        if !self.primed {
            let latency = self.latency();
            self.pending.extend(std::iter::repeat(0.0).take(latency));
            self.primed = true;
            debug!(latency, factor = self.factor, "rate transposer primed");
        }

        self.run(&frame.samples, false)?;

        self.owed += frame.samples.len() as f64 * self.factor;
        let out_len = (self.owed.floor() as u64).saturating_sub(self.emitted) as usize;
        self.emitted += out_len as u64;
        let available = self.pending.len().min(out_len);
        if available < out_len {
            warn!(
                wanted = out_len,
                available, "rate transposer underrun, padding frame with silence"
            );
        }

        frame.samples.clear();
        frame.samples.extend(self.pending.drain(..available));
        frame.samples.resize(out_len, 0.0);
        frame.overlap = (frame.overlap as f64 * self.factor) as usize;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        (self.factor - 1.0).abs() > f64::EPSILON
    }

    fn reset(&mut self) {
        self.resampler.reset();
        self.pending.clear();
        self.primed = false;
        self.owed = 0.0;
        self.emitted = 0;
    }

    fn finish(&mut self) -> Result<Vec<f32>> {
        self.run(&[], true)?;
        Ok(self.pending.drain(..).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::signal::{best_lag, sine};

    #[test]
    fn frame_and_overlap_scale_with_factor() {
        let mut t = RateTransposer::new(1.5).unwrap();
        let mut frame = AudioFrame::with_overlap(vec![0.1; 1_000], 200);
        t.process(&mut frame).unwrap();
        assert_eq!(frame.samples.len(), 1_500);
        assert_eq!(frame.overlap, 300);
    }

    #[test]
    fn rejects_factor_outside_session_bounds() {
        assert!(RateTransposer::new(8.0).is_err());
        let mut t = RateTransposer::new(2.0).unwrap();
        assert!(t.set_factor(0.05).is_err());
        assert_eq!(t.factor(), 2.0);
        t.set_factor(0.5).unwrap();
        assert_eq!(t.factor(), 0.5);
    }

    #[test]
    fn stream_is_delayed_by_latency_without_gaps() {
        let input = sine(300.0, 8_000.0, 4_096, 0.8);
        let mut t = RateTransposer::new(1.0).unwrap();

        let mut out = Vec::new();
        for chunk in input.chunks(256) {
            let mut frame = AudioFrame::new(chunk.to_vec());
            t.process(&mut frame).unwrap();
            assert_eq!(frame.samples.len(), chunk.len());
            out.extend(frame.samples);
        }
        out.extend(t.finish().unwrap());

        let latency = t.latency();
        assert_eq!(out.len(), input.len() + latency);
        assert!(out[..latency].iter().all(|&s| s == 0.0));
        assert_eq!(best_lag(&input, &out, latency + 8), latency as isize);
    }

    #[test]
    fn fractional_factor_does_not_drift() {
        let factor = 48_000.0 / 44_100.0;
        let mut t = RateTransposer::new(factor).unwrap();
        let frames = 1_000;

        let mut total = 0usize;
        for i in 0..frames {
            let mut frame = AudioFrame::new(vec![0.25; 1_024]);
            t.process(&mut frame).unwrap();
            let owed = ((i + 1) as f64 * 1_024.0 * factor).floor() as isize;
            total += frame.len();
            assert!((total as isize - owed).abs() <= 1, "frame {}", i);
            assert!(t.backlog() <= t.latency(), "frame {}: {}", i, t.backlog());
        }

        let tail = t.finish().unwrap();
        let latency = t.latency() as isize;
        assert!(
            (tail.len() as isize - latency).abs() <= 2,
            "tail {} latency {}",
            tail.len(),
            latency
        );
    }

    #[test]
    fn reset_primes_again() {
        let mut t = RateTransposer::new(2.0).unwrap();
        let mut frame = AudioFrame::new(vec![0.5; 512]);
        t.process(&mut frame).unwrap();
        t.reset();
        assert_eq!(t.resampler().pending_output(), 0);

        let mut frame = AudioFrame::new(vec![0.5; 512]);
        t.process(&mut frame).unwrap();
        assert!(frame.samples[..t.latency()].iter().all(|&s| s == 0.0));
    }
}
