//! Central constants for the resampling engine.
//!
//! Tuning values for filter design and buffer sizing live here so they can
//! be adjusted in one place and stay consistent across modules.

// ── Filter design ────────────────────────────────────────────────────────────

/// Filter table entries between two integer-spaced taps.
pub const TAPS_PER_PHASE: usize = 4_096;

/// Kernel length (in integer taps) for [`crate::configs::Quality::High`].
pub const HIGH_QUALITY_TAPS: usize = 35;

/// Kernel length (in integer taps) for [`crate::configs::Quality::Low`].
pub const LOW_QUALITY_TAPS: usize = 11;

/// Passband edge as a fraction of the Nyquist frequency.
pub const DEFAULT_ROLLOFF: f64 = 0.90;

/// Kaiser window shape. 6.0 gives roughly 60–70 dB stopband rejection.
pub const DEFAULT_BETA: f64 = 6.0;

/// Relative term size at which the `I0` power series stops.
pub const IZERO_EPSILON: f64 = 1e-21;

/// Gain applied to every output sample before the downsampling correction.
pub const UNITY_GAIN: f32 = 1.0;

// ── Session buffers ──────────────────────────────────────────────────────────

/// Extra samples of reach beyond the filter wing, for time-cursor creep.
pub const REACH_CREEP: usize = 10;

/// Smallest input window a session allocates (samples).
pub const MIN_INPUT_WINDOW: usize = 4_096;
