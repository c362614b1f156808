pub mod rate_transposer;

pub use rate_transposer::RateTransposer;

use crate::common::errors::Result;
use crate::configs::ResamplerConfig;

/// One block of mono samples moving through a [`FilterChain`].
///
/// `overlap` is how many leading samples repeat the previous frame's tail.
/// Stages that change the frame length rescale it so later stages stay
/// time-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    pub overlap: usize,
}

impl AudioFrame {
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            overlap: 0,
        }
    }

    pub fn with_overlap(samples: Vec<f32>, overlap: usize) -> Self {
        Self { samples, overlap }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A processing stage applied to each frame in turn.
pub trait AudioFilter: Send {
    /// Process a frame in place. The stage may replace the sample buffer.
    fn process(&mut self, frame: &mut AudioFrame) -> Result<()>;
    /// Whether this filter changes the signal at its current settings.
    fn is_enabled(&self) -> bool;
    /// Reset internal state (on seek or stream change).
    fn reset(&mut self);
    /// Flush samples still held after the last frame.
    fn finish(&mut self) -> Result<Vec<f32>> {
        Ok(Vec::new())
    }
}

/// An ordered chain of audio filters.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn AudioFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain that resamples by `factor`, or an empty chain when the
    /// factor is 1.
    pub fn from_config(config: &ResamplerConfig, factor: f64) -> Result<Self> {
        let mut chain = Self::new();
        let transposer = RateTransposer::with_config(factor, config)?;
        if transposer.is_enabled() {
            chain.push(Box::new(transposer));
        }
        Ok(chain)
    }

    pub fn push(&mut self, filter: Box<dyn AudioFilter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Check if any filter is active.
    pub fn is_active(&self) -> bool {
        self.filters.iter().any(|f| f.is_enabled())
    }

    /// Run `frame` through every filter in order.
    pub fn process(&mut self, frame: &mut AudioFrame) -> Result<()> {
        for filter in self.filters.iter_mut() {
            filter.process(frame)?;
        }
        Ok(())
    }

    /// Flush every filter. Each stage's tail is pushed through the stages
    /// after it, so the result is the remainder of the whole chain.
    pub fn finish(&mut self) -> Result<Vec<f32>> {
        let mut tail = Vec::new();
        for filter in self.filters.iter_mut() {
            if !tail.is_empty() {
                let mut frame = AudioFrame::new(std::mem::take(&mut tail));
                filter.process(&mut frame)?;
                tail = frame.samples;
            }
            tail.extend(filter.finish()?);
        }
        Ok(tail)
    }

    /// Reset all filter states (e.g. on seek).
    pub fn reset(&mut self) {
        for filter in self.filters.iter_mut() {
            filter.reset();
        }
    }
}
