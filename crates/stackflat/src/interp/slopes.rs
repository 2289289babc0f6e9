//! Fritsch–Carlson tangents along the depth axis.
//!
//! Tangents are chosen per pixel column: flat secants and local extrema get
//! a zero tangent, and any tangent steeper than three times its right-hand
//! secant is clamped. The clamp is one-sided, so a tangent may still exceed
//! three times its left-hand secant when that secant is much shallower.

use rayon::prelude::*;

use crate::resample::ShiftedVolume;

/// Deltas smaller than this are treated as flat.
const ZERO_EPS: f64 = f64::MIN_POSITIVE;

#[inline]
fn is_zero(v: f64) -> bool {
    v.abs() < ZERO_EPS
}

/// Per-voxel Hermite tangents, laid out like the [`ShiftedVolume`] they were
/// computed from (`idx * n_slices + (s - 1)`).
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeVolume {
    width: usize,
    height: usize,
    n_slices: usize,
    data: Vec<f64>,
}

impl SlopeVolume {
    /// `[width, height, n_slices]`.
    pub fn dims(&self) -> [usize; 3] {
        [self.width, self.height, self.n_slices]
    }

    /// Tangents of pixel `idx = x + y * width`, slice 1 first.
    pub fn column(&self, idx: usize) -> &[f64] {
        &self.data[idx * self.n_slices..(idx + 1) * self.n_slices]
    }
}

/// Monotone tangents for one depth profile.
///
/// `deltas` is scratch space of length `values.len() - 1`; `slopes` must be
/// as long as `values` and is fully overwritten.
///
/// With `n = values.len()` and 1-based knots `s`, the tangent rules are:
/// - flat secant `d[s]`: `m[s] = 0` (and `m[s+1] = 0` on the last secant)
/// - first knot: `m[1] = d[1]`
/// - last secant: `m[n] = d[n-1]`; `m[n-1]` keeps its zero initialization
/// - flat left secant or a sign change: `m[s] = 0`
/// - otherwise the mean of both secants
///
/// followed by the `0 <= m / d <= 3` clamp.
pub fn fritsch_carlson_slopes(values: &[f64], deltas: &mut [f64], slopes: &mut [f64]) {
    let n = values.len();
    debug_assert_eq!(slopes.len(), n);
    slopes.fill(0.0);
    if n < 2 {
        return;
    }
    debug_assert_eq!(deltas.len(), n - 1);

    for (d, w) in deltas.iter_mut().zip(values.windows(2)) {
        *d = w[1] - w[0];
    }

    let last = n - 2;
    for i in 0..=last {
        let d = deltas[i];

        if is_zero(d) {
            slopes[i] = 0.0;
            if i == last {
                slopes[i + 1] = 0.0;
            }
        } else if i == 0 {
            slopes[i] = d;
        } else if i == last {
            slopes[i + 1] = d;
        } else {
            let d_prev = deltas[i - 1];
            slopes[i] = if is_zero(d_prev) || d_prev * d < 0.0 {
                0.0
            } else {
                0.5 * (d_prev + d)
            };
        }

        if !is_zero(d) {
            slopes[i] = clamp_to_secant(slopes[i], d);
            if i == last {
                slopes[i + 1] = clamp_to_secant(slopes[i + 1], d);
            }
        } else if i > 0 && !is_zero(deltas[i - 1]) {
            slopes[i] = clamp_to_secant(slopes[i], deltas[i - 1]);
        }
    }
}

#[inline]
fn clamp_to_secant(slope: f64, secant: f64) -> f64 {
    let ratio = slope / secant;
    if ratio < 0.0 {
        0.0
    } else if ratio > 3.0 {
        3.0 * secant
    } else {
        slope
    }
}

/// Tangents for every pixel column of `volume`.
pub fn compute_slopes(volume: &ShiftedVolume) -> SlopeVolume {
    let n = volume.n_slices();
    let mut data = vec![0.0f64; volume.width() * volume.height() * n];

    data.par_chunks_exact_mut(n)
        .zip(volume.par_columns())
        .for_each_init(
            || vec![0.0f64; n.saturating_sub(1)],
            |deltas, (slopes, values)| fritsch_carlson_slopes(values, deltas, slopes),
        );

    SlopeVolume {
        width: volume.width(),
        height: volume.height(),
        n_slices: n,
        data,
    }
}
