//! `resample/kernel.rs`: one-wing inner products against a [`FilterTable`].
//!
//! An output sample at fractional time `t` is the left wing evaluated
//! backwards from `floor(t)` at phase `t - floor(t)`, plus the right wing
//! evaluated forwards from `floor(t) + 1` at phase `1 - (t - floor(t))`.
//!
//! No bounds checks beyond slice indexing: callers keep `filter_width`
//! samples of history and lookahead around `index`.

use super::filter::FilterTable;

/// Which half of the symmetric kernel is being walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wing {
    /// Walks towards older samples.
    Left,
    /// Walks towards newer samples.
    Right,
}

impl Wing {
    #[inline]
    fn step(self) -> isize {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Fixed-phase wing sum, used when `factor >= 1`.
///
/// Walks the table at an exact `taps_per_phase` stride. The right wing drops
/// the final coefficient, and at phase zero it starts one stride in so the
/// centre tap is only counted by the left wing.
#[inline]
pub fn filter_fixed_phase(
    table: &FilterTable,
    samples: &[f32],
    index: usize,
    phase: f64,
    wing: Wing,
    interpolate: bool,
) -> f32 {
    let imp = table.coefficients();
    let imp_d = table.deltas();
    let npc = table.taps_per_phase();

    let ph = phase * npc as f64;
    let frac = (ph - ph.floor()) as f32;
    let mut hp = ph as usize;
    let mut end = imp.len();

    if wing == Wing::Right {
        end -= 1;
        if ph == 0.0 {
            hp += npc;
        }
    }

    let step = wing.step();
    let mut xi = index as isize;
    let mut v = 0.0f32;
    while hp < end {
        let mut t = imp[hp];
        if interpolate {
            t += imp_d[hp] * frac;
        }
        v += t * samples[xi as usize];
        hp += npc;
        xi += step;
    }
    v
}

/// Variable-phase wing sum, used when `factor < 1`.
///
/// `stride` is `min(taps_per_phase, factor * taps_per_phase)`: walking the
/// table more densely stretches the impulse response over more input
/// samples, which lowers the cutoff to the output Nyquist frequency.
#[inline]
pub fn filter_variable_phase(
    table: &FilterTable,
    samples: &[f32],
    index: usize,
    phase: f64,
    wing: Wing,
    stride: f64,
    interpolate: bool,
) -> f32 {
    let imp = table.coefficients();
    let imp_d = table.deltas();

    let mut ho = phase * stride;
    let mut end = imp.len();

    if wing == Wing::Right {
        end -= 1;
        if phase == 0.0 {
            ho += stride;
        }
    }

    let step = wing.step();
    let mut xi = index as isize;
    let mut v = 0.0f32;
    loop {
        let hp = ho as usize;
        if hp >= end {
            break;
        }
        let mut t = imp[hp];
        if interpolate {
            t += imp_d[hp] * (ho - ho.floor()) as f32;
        }
        v += t * samples[xi as usize];
        ho += stride;
        xi += step;
    }
    v
}

/// Table stride for the variable-phase walk at `factor`.
#[inline]
pub fn variable_stride(table: &FilterTable, factor: f64) -> f64 {
    let npc = table.taps_per_phase() as f64;
    npc.min(factor * npc)
}
