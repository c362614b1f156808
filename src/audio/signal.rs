//! Test-signal generation and simple measurements on sample buffers.

use std::f64::consts::PI;

use rand::Rng;

/// `len` samples of a sine at `frequency` Hz sampled at `sample_rate` Hz.
pub fn sine(frequency: f64, sample_rate: f64, len: usize, amplitude: f32) -> Vec<f32> {
    let w = 2.0 * PI * frequency / sample_rate;
    (0..len)
        .map(|i| amplitude * (w * i as f64).sin() as f32)
        .collect()
}

/// Add uniform noise in `[-amplitude, amplitude]` to every sample.
pub fn add_noise<R: Rng + ?Sized>(rng: &mut R, samples: &mut [f32], amplitude: f32) {
    if amplitude <= 0.0 {
        return;
    }
    for s in samples.iter_mut() {
        *s += rng.gen_range(-amplitude..=amplitude);
    }
}

/// Number of sign changes between consecutive samples.
pub fn zero_crossings(samples: &[f32]) -> usize {
    samples
        .windows(2)
        .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
        .count()
}

/// Lag in `-max_lag..=max_lag` at which `b` best lines up with `a`.
///
/// A positive lag means `b` is delayed relative to `a`.
pub fn best_lag(a: &[f32], b: &[f32], max_lag: usize) -> isize {
    let max_lag = max_lag as isize;
    let mut best = (0isize, f64::NEG_INFINITY);
    for lag in -max_lag..=max_lag {
        let mut sum = 0.0f64;
        for (i, &av) in a.iter().enumerate() {
            let j = i as isize + lag;
            if j >= 0 && (j as usize) < b.len() {
                sum += av as f64 * b[j as usize] as f64;
            }
        }
        if sum > best.1 {
            best = (lag, sum);
        }
    }
    best.0
}

/// Largest absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}
