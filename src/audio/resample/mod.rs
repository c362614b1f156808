//! Band-limited sample-rate conversion.
//!
//! | Piece | Role |
//! |---|---|
//! | [`FilterTable`] | Kaiser-windowed sinc wing, designed once and shared |
//! | [`kernel`] | fixed-phase (`factor >= 1`) and variable-phase wing sums |
//! | [`Resampler`] | streaming session: sliding window, time cursor, staging |
//! | [`SampleBuffers`] | how a session pulls input and pushes output |

pub mod engine;
pub mod exchange;
pub mod filter;
pub mod kernel;

pub use engine::{Resampler, SessionState};
pub use exchange::{ProcessResult, RingBuffers, SampleBuffers, SliceBuffers, VecBuffers};
pub use filter::FilterTable;
