use serde::{Deserialize, Serialize};

use crate::audio::constants::{DEFAULT_BETA, DEFAULT_ROLLOFF, HIGH_QUALITY_TAPS, LOW_QUALITY_TAPS};

/// Filter length preset.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// 35-tap kernel: slower, steeper transition band.
    #[default]
    High,
    /// 11-tap kernel.
    Low,
}

impl Quality {
    /// Total kernel length in integer-spaced taps.
    pub fn kernel_taps(self) -> usize {
        match self {
            Self::High => HIGH_QUALITY_TAPS,
            Self::Low => LOW_QUALITY_TAPS,
        }
    }
}

/// Construction parameters for a [`crate::audio::resample::Resampler`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ResamplerConfig {
    #[serde(default)]
    pub quality: Quality,
    #[serde(default = "default_min_factor")]
    pub min_factor: f64,
    #[serde(default = "default_max_factor")]
    pub max_factor: f64,
    #[serde(default = "default_rolloff")]
    pub rolloff: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Interpolate filter coefficients between table phases.
    #[serde(default)]
    pub interpolate: bool,
}

fn default_min_factor() -> f64 {
    0.1
}

fn default_max_factor() -> f64 {
    4.0
}

fn default_rolloff() -> f64 {
    DEFAULT_ROLLOFF
}

fn default_beta() -> f64 {
    DEFAULT_BETA
}

impl Default for ResamplerConfig {
    fn default() -> Self {
        Self {
            quality: Quality::High,
            min_factor: default_min_factor(),
            max_factor: default_max_factor(),
            rolloff: DEFAULT_ROLLOFF,
            beta: DEFAULT_BETA,
            interpolate: false,
        }
    }
}

impl ResamplerConfig {
    pub fn new(quality: Quality, min_factor: f64, max_factor: f64) -> Self {
        Self {
            quality,
            min_factor,
            max_factor,
            ..Self::default()
        }
    }

    pub fn with_interpolation(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }
}
