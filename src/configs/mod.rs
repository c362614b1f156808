pub mod base;
pub mod demo;
pub mod logging;
pub mod resampler;

pub use base::*;
pub use demo::*;
pub use logging::*;
pub use resampler::*;
