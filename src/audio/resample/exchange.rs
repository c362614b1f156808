//! `resample/exchange.rs`: how the engine reaches caller-owned storage.
//!
//! The engine never owns the stream's samples. Each call asks a
//! [`SampleBuffers`] how much input is ready and how much output room is
//! left, then pulls and pushes exactly that many samples.

use crate::audio::buffer::SampleRing;

/// Source of input and sink for output for one `process` call.
pub trait SampleBuffers {
    /// Input samples currently available.
    fn input_buffer_length(&self) -> usize;

    /// Output samples that can currently be accepted.
    fn output_buffer_length(&self) -> usize;

    /// Fill all of `dest` with the next input samples.
    ///
    /// Never called with more than [`Self::input_buffer_length`] samples.
    fn produce_input(&mut self, dest: &mut [f32]);

    /// Take all of `src` as the next output samples.
    ///
    /// Never called with more than [`Self::output_buffer_length`] samples.
    fn consume_output(&mut self, src: &[f32]);
}

/// Samples moved by one slice-based `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessResult {
    pub input_consumed: usize,
    pub output_generated: usize,
}

/// Exchange over a borrowed input slice and a borrowed output slice.
pub struct SliceBuffers<'a> {
    input: &'a [f32],
    output: &'a mut [f32],
    input_pos: usize,
    output_pos: usize,
}

impl<'a> SliceBuffers<'a> {
    pub fn new(input: &'a [f32], output: &'a mut [f32]) -> Self {
        Self {
            input,
            output,
            input_pos: 0,
            output_pos: 0,
        }
    }

    pub fn result(&self) -> ProcessResult {
        ProcessResult {
            input_consumed: self.input_pos,
            output_generated: self.output_pos,
        }
    }
}

impl SampleBuffers for SliceBuffers<'_> {
    fn input_buffer_length(&self) -> usize {
        self.input.len() - self.input_pos
    }

    fn output_buffer_length(&self) -> usize {
        self.output.len() - self.output_pos
    }

    fn produce_input(&mut self, dest: &mut [f32]) {
        let end = self.input_pos + dest.len();
        dest.copy_from_slice(&self.input[self.input_pos..end]);
        self.input_pos = end;
    }

    fn consume_output(&mut self, src: &[f32]) {
        let end = self.output_pos + src.len();
        self.output[self.output_pos..end].copy_from_slice(src);
        self.output_pos = end;
    }
}

/// Exchange that appends every output sample to a growable `Vec`.
///
/// Output capacity is unbounded, so a single call always drains the engine.
pub struct VecBuffers<'a> {
    input: &'a [f32],
    input_pos: usize,
    pub output: Vec<f32>,
}

impl<'a> VecBuffers<'a> {
    pub fn new(input: &'a [f32]) -> Self {
        Self {
            input,
            input_pos: 0,
            output: Vec::new(),
        }
    }

    pub fn input_consumed(&self) -> usize {
        self.input_pos
    }
}

impl SampleBuffers for VecBuffers<'_> {
    fn input_buffer_length(&self) -> usize {
        self.input.len() - self.input_pos
    }

    fn output_buffer_length(&self) -> usize {
        usize::MAX - self.output.len()
    }

    fn produce_input(&mut self, dest: &mut [f32]) {
        let end = self.input_pos + dest.len();
        dest.copy_from_slice(&self.input[self.input_pos..end]);
        self.input_pos = end;
    }

    fn consume_output(&mut self, src: &[f32]) {
        self.output.extend_from_slice(src);
    }
}

/// Ring-backed exchange: a producer writes into `input` and a consumer reads
/// from `output` at whatever block sizes suit them.
pub struct RingBuffers {
    pub input: SampleRing,
    pub output: SampleRing,
}

impl RingBuffers {
    pub fn new(input_capacity: usize, output_capacity: usize) -> Self {
        Self {
            input: SampleRing::new(input_capacity),
            output: SampleRing::new(output_capacity),
        }
    }
}

impl SampleBuffers for RingBuffers {
    fn input_buffer_length(&self) -> usize {
        self.input.len()
    }

    fn output_buffer_length(&self) -> usize {
        self.output.remaining()
    }

    fn produce_input(&mut self, dest: &mut [f32]) {
        self.input.read_into(dest);
    }

    fn consume_output(&mut self, src: &[f32]) {
        self.output.write(src);
    }
}
