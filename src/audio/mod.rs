pub mod buffer;
pub mod constants;
pub mod filters;
pub mod resample;
pub mod signal;

pub use buffer::SampleRing;
pub use filters::{AudioFilter, AudioFrame, FilterChain, RateTransposer};
pub use resample::{FilterTable, ProcessResult, Resampler, SampleBuffers, SessionState};
