//! `resample/engine.rs`: streaming band-limited resampling session.
//!
//! A [`Resampler`] keeps a sliding input window `x`, an output staging
//! buffer `y` and the sub-sample phase of the next output position. Each
//! pass pulls input into the window, convolves every output position whose
//! kernel fits inside it, then slides the still-needed tail back to the
//! start of the window. The position is an integer sample index plus a
//! phase in `[0, 1)`, and sliding only ever subtracts whole samples, so the
//! phase sequence does not depend on where passes begin. Chunked input
//! therefore gives bit-identical output to a single block, and the factor
//! may change between calls.
//!
//! Window layout (`fw` = filter width):
//!
//! ```text
//! 0        fw                          xread      x_size   x_size + fw
//! | history | processable ... | lookahead |  free  | zero pad |
//!           ^ cursor at the start of every pass
//! ```

use std::sync::Arc;

use tracing::{debug, trace};

use super::exchange::{ProcessResult, SampleBuffers, SliceBuffers};
use super::filter::FilterTable;
use super::kernel::{Wing, filter_fixed_phase, filter_variable_phase, variable_stride};
use crate::audio::constants::{MIN_INPUT_WINDOW, REACH_CREEP};
use crate::common::errors::{ResampleError, Result};
use crate::configs::{Quality, ResamplerConfig};

/// Where a session is in the life of its stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed or reset, nothing processed yet.
    Idle,
    /// Fed with more input to come.
    Streaming,
    /// The last batch has been supplied; flushing the tail.
    Draining,
    /// The last batch has been fully delivered.
    Done,
}

/// One resampling session over a shared filter table.
///
/// Cloning deep-copies the window, staging buffer and cursors and shares
/// the table, so a clone continues exactly as the source session would.
#[derive(Debug, Clone)]
pub struct Resampler {
    table: Arc<FilterTable>,
    interpolate: bool,
    min_factor: f64,
    max_factor: f64,
    filter_width: usize,
    x_size: usize,
    /// Input window plus `filter_width` guard samples for zero padding.
    x: Vec<f32>,
    /// Output staging buffer.
    y: Vec<f32>,
    /// Write cursor: where the next input sample lands in `x`.
    xread: usize,
    /// Staged output samples not yet delivered.
    yp: usize,
    /// Sub-sample offset of the next output position past `x[filter_width]`.
    phase: f64,
    state: SessionState,
}

/// Input samples the kernel needs on either side of the cursor at `factor`.
fn reach(kernel_taps: usize, factor: f64) -> usize {
    ((kernel_taps + 1) as f64 / 2.0 * f64::max(1.0, 1.0 / factor) + REACH_CREEP as f64) as usize
}

fn check_bounds(min_factor: f64, max_factor: f64) -> Result<()> {
    // Written so that NaN bounds are rejected too.
    if !(min_factor > 0.0 && max_factor > 0.0) {
        return Err(ResampleError::NonPositiveFactorBounds {
            min: min_factor,
            max: max_factor,
        });
    }
    if max_factor < min_factor {
        return Err(ResampleError::InvertedFactorBounds {
            min: min_factor,
            max: max_factor,
        });
    }
    Ok(())
}

impl Resampler {
    /// Create a session with the default rolloff and Kaiser beta.
    ///
    /// Fails if either bound is not positive or `max_factor < min_factor`.
    pub fn new(quality: Quality, min_factor: f64, max_factor: f64) -> Result<Self> {
        Self::from_config(&ResamplerConfig::new(quality, min_factor, max_factor))
    }

    /// Create a session, designing a fresh filter table from `config`.
    pub fn from_config(config: &ResamplerConfig) -> Result<Self> {
        check_bounds(config.min_factor, config.max_factor)?;
        let table = FilterTable::with_defaults(
            config.quality.kernel_taps(),
            config.rolloff,
            config.beta,
        )?;
        Self::with_table(
            Arc::new(table),
            config.min_factor,
            config.max_factor,
            config.interpolate,
        )
    }

    /// Create a session over an existing table, skipping filter design.
    pub fn with_table(
        table: Arc<FilterTable>,
        min_factor: f64,
        max_factor: f64,
        interpolate: bool,
    ) -> Result<Self> {
        check_bounds(min_factor, max_factor)?;

        let taps = table.kernel_taps();
        let filter_width = reach(taps, min_factor).max(reach(taps, max_factor));

        // At least MIN_INPUT_WINDOW, and always room for the filter's reach
        // on both sides plus some creep.
        let x_size = (2 * filter_width + REACH_CREEP).max(MIN_INPUT_WINDOW);
        let y_size = (x_size as f64 * max_factor + 2.0) as usize;

        debug!(
            filter_width,
            x_size, y_size, min_factor, max_factor, interpolate, "created resampler session"
        );

        Ok(Self {
            table,
            interpolate,
            min_factor,
            max_factor,
            filter_width,
            x_size,
            x: vec![0.0; x_size + filter_width],
            y: vec![0.0; y_size],
            xread: filter_width,
            yp: 0,
            phase: 0.0,
            state: SessionState::Idle,
        })
    }

    /// Samples of history and lookahead kept around the read cursor.
    pub fn filter_width(&self) -> usize {
        self.filter_width
    }

    pub fn min_factor(&self) -> f64 {
        self.min_factor
    }

    pub fn max_factor(&self) -> f64 {
        self.max_factor
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Output samples produced but not yet accepted by an exchange.
    pub fn pending_output(&self) -> usize {
        self.yp
    }

    /// The shared filter table.
    pub fn table(&self) -> &Arc<FilterTable> {
        &self.table
    }

    /// Return to the freshly constructed state, keeping the filter table.
    pub fn reset(&mut self) {
        self.x.fill(0.0);
        self.xread = self.filter_width;
        self.yp = 0;
        self.phase = 0.0;
        self.set_state(SessionState::Idle);
    }

    /// Resample as much as `buffers` allows at `factor`.
    ///
    /// Input is not necessarily drained: the call stops early when the
    /// output side fills up, and staged output is always delivered before
    /// any new input is read. Pass `last_batch = true` once the input side
    /// holds the final samples of the stream, and keep calling until this
    /// returns `true`.
    ///
    /// Returns `true` iff nothing was consumed, nothing was produced and
    /// nothing is left staged.
    pub fn process<B>(&mut self, factor: f64, buffers: &mut B, last_batch: bool) -> Result<bool>
    where
        B: SampleBuffers + ?Sized,
    {
        if !(factor >= self.min_factor && factor <= self.max_factor) {
            return Err(ResampleError::FactorOutOfRange {
                factor,
                min: self.min_factor,
                max: self.max_factor,
            });
        }

        let out_len = buffers.output_buffer_length();
        let in_len = buffers.input_buffer_length();
        let mut in_used = 0usize;
        let mut out_count = 0usize;

        self.drain_staged(buffers, out_len, &mut out_count);
        if self.yp != 0 {
            // Not enough room for what is already staged; leave input alone.
            return Ok(self.finish_call(last_batch, in_used, out_count));
        }

        // A narrower passband sums more taps, so scale the gain back down.
        let mut gain = self.table.gain();
        if factor < 1.0 {
            gain = (gain as f64 * factor) as f32;
        }

        loop {
            let len = (self.x_size - self.xread).min(in_len - in_used);
            if len > 0 {
                buffers.produce_input(&mut self.x[self.xread..self.xread + len]);
                in_used += len;
                self.xread += len;
            }

            let fw = self.filter_width;
            let nx = if last_batch && in_used == in_len {
                // Final samples: zero-pad the lookahead and process to the end.
                self.x[self.xread..self.xread + fw].fill(0.0);
                self.xread as isize - fw as isize
            } else {
                self.xread as isize - 2 * fw as isize
            };

            if nx <= 0 {
                break;
            }
            let nx = nx as usize;

            let (nout, advance) = self.convolve_block(factor, nx, gain);
            self.reanchor(advance);
            self.yp = nout;

            trace!(nx, nout, advance, xread = self.xread, phase = self.phase, "resampled block");

            self.drain_staged(buffers, out_len, &mut out_count);
            if self.yp != 0 {
                break;
            }
        }

        Ok(self.finish_call(last_batch, in_used, out_count))
    }

    /// Resample from `input` into `output`, reporting how much of each was used.
    pub fn process_slices(
        &mut self,
        factor: f64,
        input: &[f32],
        last_batch: bool,
        output: &mut [f32],
    ) -> Result<ProcessResult> {
        let mut buffers = SliceBuffers::new(input, output);
        self.process(factor, &mut buffers, last_batch)?;
        Ok(buffers.result())
    }

    /// Run the kernel at every output position whose integer part lies in
    /// `[filter_width, filter_width + nx)` and stage the results.
    ///
    /// Returns the number of samples staged and how many whole samples the
    /// cursor moved, which is at least `nx`.
    fn convolve_block(&mut self, factor: f64, nx: usize, gain: f32) -> (usize, usize) {
        let table = &*self.table;
        let x = &self.x;
        let y = &mut self.y;
        let interpolate = self.interpolate;

        let dt = 1.0 / factor;
        let start = self.filter_width;
        let end = start + nx;
        let mut idx = start;
        let mut phase = self.phase;
        let mut n = 0usize;

        let stride = (factor < 1.0).then(|| variable_stride(table, factor));
        while idx < end {
            let left_phase = phase;
            let right_phase = 1.0 - phase;
            let v = match stride {
                None => {
                    filter_fixed_phase(table, x, idx, left_phase, Wing::Left, interpolate)
                        + filter_fixed_phase(
                            table,
                            x,
                            idx + 1,
                            right_phase,
                            Wing::Right,
                            interpolate,
                        )
                }
                Some(stride) => {
                    filter_variable_phase(
                        table,
                        x,
                        idx,
                        left_phase,
                        Wing::Left,
                        stride,
                        interpolate,
                    ) + filter_variable_phase(
                        table,
                        x,
                        idx + 1,
                        right_phase,
                        Wing::Right,
                        stride,
                        interpolate,
                    )
                }
            };
            y[n] = v * gain;
            n += 1;

            phase += dt;
            let whole = phase.floor();
            idx += whole as usize;
            phase -= whole;
        }

        self.phase = phase;
        (n, idx - start)
    }

    /// Slide the window `advance` samples so the cursor sits at
    /// `filter_width` again, keeping its history.
    fn reanchor(&mut self, advance: usize) {
        let reuse = self.xread - advance;
        self.x.copy_within(advance..self.xread, 0);
        self.xread = reuse;
    }

    /// Hand as much staged output to `buffers` as its capacity allows.
    fn drain_staged<B>(&mut self, buffers: &mut B, out_len: usize, out_count: &mut usize)
    where
        B: SampleBuffers + ?Sized,
    {
        if self.yp == 0 || out_len <= *out_count {
            return;
        }
        let len = (out_len - *out_count).min(self.yp);
        buffers.consume_output(&self.y[..len]);
        *out_count += len;
        self.y.copy_within(len..self.yp, 0);
        self.yp -= len;
    }

    fn finish_call(&mut self, last_batch: bool, in_used: usize, out_count: usize) -> bool {
        let completed = in_used == 0 && out_count == 0 && self.yp == 0;
        let next = match (last_batch, completed) {
            (true, true) => SessionState::Done,
            (true, false) => SessionState::Draining,
            (false, _) => SessionState::Streaming,
        };
        self.set_state(next);
        completed
    }

    fn set_state(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "resampler state change");
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::resample::exchange::VecBuffers;

    fn run_to_end(r: &mut Resampler, factor: f64, input: &[f32]) -> Vec<f32> {
        let mut buffers = VecBuffers::new(input);
        while !r.process(factor, &mut buffers, true).unwrap() {}
        buffers.output
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(matches!(
            Resampler::new(Quality::High, 2.0, 1.0),
            Err(ResampleError::InvertedFactorBounds { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_bounds() {
        assert!(matches!(
            Resampler::new(Quality::Low, 0.0, 1.0),
            Err(ResampleError::NonPositiveFactorBounds { .. })
        ));
        assert!(Resampler::new(Quality::Low, -1.0, -0.5).is_err());
        assert!(Resampler::new(Quality::Low, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn rejects_factor_outside_bounds() {
        let mut r = Resampler::new(Quality::High, 1.0, 4.0).unwrap();
        let mut out = [0.0; 16];
        let err = r.process_slices(0.5, &[0.0; 16], false, &mut out).unwrap_err();
        assert_eq!(
            err,
            ResampleError::FactorOutOfRange {
                factor: 0.5,
                min: 1.0,
                max: 4.0
            }
        );
        assert!(r.process_slices(4.5, &[0.0; 16], false, &mut out).is_err());
        assert_eq!(r.state(), SessionState::Idle);
    }

    #[test]
    fn filter_width_covers_the_smallest_factor() {
        let hq = Resampler::new(Quality::High, 0.5, 4.0).unwrap();
        assert_eq!(hq.filter_width(), 46);
        let lq = Resampler::new(Quality::Low, 0.1, 4.0).unwrap();
        assert_eq!(lq.filter_width(), 70);
        let up = Resampler::new(Quality::High, 1.0, 2.0).unwrap();
        assert_eq!(up.filter_width(), 28);
    }

    #[test]
    fn short_input_waits_for_lookahead() {
        let mut r = Resampler::new(Quality::High, 1.0, 2.0).unwrap();
        let input = vec![0.25f32; 20];
        let mut out = vec![0.0; 64];
        let res = r.process_slices(1.0, &input, false, &mut out).unwrap();
        assert_eq!(res.input_consumed, 20);
        assert_eq!(res.output_generated, 0);
        assert_eq!(r.state(), SessionState::Streaming);
    }

    #[test]
    fn lifecycle_reaches_done_after_flush() {
        let mut r = Resampler::new(Quality::Low, 0.5, 2.0).unwrap();
        assert_eq!(r.state(), SessionState::Idle);

        let input: Vec<f32> = (0..300).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut buffers = VecBuffers::new(&input);
        assert!(!r.process(2.0, &mut buffers, false).unwrap());
        assert_eq!(r.state(), SessionState::Streaming);

        assert!(!r.process(2.0, &mut buffers, true).unwrap());
        assert_eq!(r.state(), SessionState::Draining);

        assert!(r.process(2.0, &mut buffers, true).unwrap());
        assert_eq!(r.state(), SessionState::Done);
        assert_eq!(buffers.output.len(), 600);
    }

    #[test]
    fn staged_output_is_delivered_before_new_input() {
        let mut r = Resampler::new(Quality::High, 0.5, 4.0).unwrap();
        let input: Vec<f32> = (0..400).map(|i| (i as f32 * 0.02).sin()).collect();

        let mut out = vec![0.0; 50];
        let first = r.process_slices(4.0, &input, true, &mut out).unwrap();
        assert_eq!(first.input_consumed, 400);
        assert_eq!(first.output_generated, 50);
        assert_eq!(r.pending_output(), 1_550);

        // Output is still staged, so this call must not read any input.
        let second = r.process_slices(4.0, &input, true, &mut out).unwrap();
        assert_eq!(second.input_consumed, 0);
        assert_eq!(second.output_generated, 50);
        assert_eq!(r.pending_output(), 1_500);
    }

    #[test]
    fn zero_output_room_with_staged_samples_is_not_completion() {
        let mut r = Resampler::new(Quality::Low, 1.0, 2.0).unwrap();
        let input = vec![0.5f32; 200];
        let mut out = vec![0.0; 10];
        r.process_slices(2.0, &input, true, &mut out).unwrap();
        assert!(r.pending_output() > 0);

        let mut none: [f32; 0] = [];
        let mut buffers = SliceBuffers::new(&[], &mut none);
        assert!(!r.process(2.0, &mut buffers, true).unwrap());
        assert_eq!(r.state(), SessionState::Draining);
    }

    #[test]
    fn clone_continues_like_its_source() {
        let input: Vec<f32> = (0..2_000).map(|i| (i as f32 * 0.013).sin() * 0.7).collect();
        let mut source = Resampler::new(Quality::High, 0.5, 2.0).unwrap();

        let mut head = vec![0.0; 4_000];
        source
            .process_slices(1.5, &input[..900], false, &mut head)
            .unwrap();

        let mut fork = source.clone();
        assert!(Arc::ptr_eq(source.table(), fork.table()));

        let a = run_to_end(&mut source, 1.5, &input[900..]);
        let b = run_to_end(&mut fork, 1.5, &input[900..]);
        assert_eq!(a, b);
    }

    #[test]
    fn phase_carries_exactly_across_calls() {
        let input: Vec<f32> = (0..1_500).map(|i| (i as f32 * 0.031).sin() * 0.6).collect();
        for &factor in &[0.7, 1.0 / 0.9, 48_000.0 / 44_100.0] {
            let mut whole = Resampler::new(Quality::Low, 0.5, 2.0).unwrap();
            let expected = run_to_end(&mut whole, factor, &input);

            for &k in &[1usize, 77, 500, 1_499] {
                let mut r = Resampler::new(Quality::Low, 0.5, 2.0).unwrap();
                let mut buffers = VecBuffers::new(&input[..k]);
                r.process(factor, &mut buffers, false).unwrap();
                let mut got = buffers.output;
                got.extend(run_to_end(&mut r, factor, &input[k..]));
                assert_eq!(got, expected, "factor {} split {}", factor, k);
            }
        }
    }

    #[test]
    fn reset_restores_a_fresh_session() {
        let input: Vec<f32> = (0..500).map(|i| (i as f32 * 0.1).cos()).collect();
        let mut r = Resampler::new(Quality::Low, 0.5, 2.0).unwrap();
        let first = run_to_end(&mut r, 0.75, &input);

        r.reset();
        assert_eq!(r.state(), SessionState::Idle);
        let second = run_to_end(&mut r, 0.75, &input);
        assert_eq!(first, second);
    }

    #[test]
    fn sessions_can_share_one_table() {
        let a = Resampler::new(Quality::Low, 0.5, 2.0).unwrap();
        let b = Resampler::with_table(a.table().clone(), 1.0, 3.0, true).unwrap();
        assert!(Arc::ptr_eq(a.table(), b.table()));
        assert_eq!(b.filter_width(), 16);
    }
}
