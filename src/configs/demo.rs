use serde::{Deserialize, Serialize};

/// Test-tone settings for the `sincflow` binary.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DemoConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_factor")]
    pub factor: f64,
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    /// Mix uniform noise of this peak amplitude into the tone.
    #[serde(default)]
    pub noise: f32,
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_frequency() -> f64 {
    440.0
}

fn default_duration_ms() -> u64 {
    1_000
}

fn default_factor() -> f64 {
    48_000.0 / 44_100.0
}

fn default_frame_size() -> usize {
    1_024
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            frequency: default_frequency(),
            duration_ms: default_duration_ms(),
            factor: default_factor(),
            frame_size: default_frame_size(),
            noise: 0.0,
        }
    }
}
