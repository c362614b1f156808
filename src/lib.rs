//! Streaming band-limited sample-rate conversion.
//!
//! ```no_run
//! use sincflow::audio::Resampler;
//! use sincflow::configs::Quality;
//!
//! let mut r = Resampler::new(Quality::High, 0.5, 4.0)?;
//! let input = vec![0.0f32; 1_024];
//! let mut output = vec![0.0f32; 2_048];
//! let res = r.process_slices(2.0, &input, true, &mut output)?;
//! assert!(res.output_generated <= 2_048);
//! # Ok::<(), sincflow::common::ResampleError>(())
//! ```

pub mod audio;
pub mod common;
pub mod configs;
