//! Fractional-slice interpolation of the integer-shifted volume.
//!
//! Output slice `s` (1-based, `s = 1..n_slices-1`) samples each pixel column
//! between knots `s` and `s + 1` at that pixel's fractional shift. The
//! output therefore has one slice fewer than the input; the last knot is
//! only ever used as a right endpoint.

pub mod hermite;
mod slopes;

use rayon::prelude::*;

use crate::error::{check_shape, FlattenError};
use crate::resample::ShiftedVolume;
use crate::shift::ShiftField;
use crate::stack::Stack;

pub use slopes::{compute_slopes, fritsch_carlson_slopes, SlopeVolume};

/// Interpolation scheme between integer-shifted slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Straight-line blend of the two bracketing slices.
    #[default]
    Linear,
    /// Cubic Hermite with Fritsch–Carlson tangents: flat at plateaus and
    /// local extrema of the column.
    #[serde(alias = "monotoneCubic")]
    MonotoneCubic,
}

impl InterpolationMethod {
    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::MonotoneCubic => "Monotone Cubic",
        }
    }

    /// Returns `true` when this method needs a [`SlopeVolume`].
    pub fn needs_slopes(self) -> bool {
        matches!(self, Self::MonotoneCubic)
    }
}

/// Resample `volume` at each pixel's fractional shift.
///
/// `slopes == None` selects linear blending, `Some` the Hermite segment with
/// the given tangents. Requires at least two slices.
pub fn interpolate_stack(
    volume: &ShiftedVolume,
    shifts: &ShiftField,
    slopes: Option<&SlopeVolume>,
) -> Result<Stack, FlattenError> {
    shifts.check_plane(volume.width(), volume.height())?;
    if let Some(slopes) = slopes {
        check_shape("slope volume", volume.dims(), slopes.dims())?;
    }
    let n = volume.n_slices();
    if n < 2 {
        return Err(FlattenError::EmptyStack {
            dims: volume.dims(),
        });
    }

    let plane = volume.width() * volume.height();
    let fraction = shifts.fraction();
    let mut out = vec![0.0f32; plane * (n - 1)];

    match slopes {
        None => fill_slices(&mut out, plane, |idx, s| {
            let col = volume.column(idx);
            hermite::lerp(col[s - 1], col[s], fraction[idx])
        }),
        Some(slopes) => fill_slices(&mut out, plane, |idx, s| {
            let col = volume.column(idx);
            let m = slopes.column(idx);
            hermite::hermite(col[s - 1], col[s], m[s - 1], m[s], fraction[idx])
        }),
    }

    Stack::new(volume.width(), volume.height(), n - 1, out)
}

/// Evaluate `sample(idx, s)` for every pixel of every output slice `s` (1-based).
fn fill_slices<F>(out: &mut [f32], plane: usize, sample: F)
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    out.par_chunks_exact_mut(plane)
        .enumerate()
        .for_each(|(k, slice)| {
            let s = k + 1;
            for (idx, px) in slice.iter_mut().enumerate() {
                *px = sample(idx, s) as f32;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn single_column(values: &[f64], fraction: f64) -> (ShiftedVolume, ShiftField) {
        let vol = ShiftedVolume::from_columns(1, 1, values.len(), values.to_vec()).unwrap();
        let shifts = ShiftField::from_parts(1, 1, 0.0, vec![0], vec![fraction]).unwrap();
        (vol, shifts)
    }

    fn column_of(stack: &Stack) -> Vec<f32> {
        (1..=stack.n_slices()).map(|s| stack.get(0, 0, s)).collect()
    }

    #[test]
    fn output_is_one_slice_shorter() {
        let (vol, shifts) = single_column(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.0);
        let out = interpolate_stack(&vol, &shifts, None).unwrap();
        assert_eq!(out.dims(), [1, 1, 4]);
        assert_eq!(column_of(&out), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn linear_blends_neighbours() {
        let (vol, shifts) = single_column(&[0.0, 10.0, 30.0], 0.25);
        let out = interpolate_stack(&vol, &shifts, None).unwrap();
        assert_eq!(column_of(&out), vec![2.5, 15.0]);
    }

    #[test]
    fn cubic_with_zero_fraction_reproduces_knots() {
        let values = [0.0, 3.0, 1.0, 8.0, 8.0, 2.0];
        let (vol, shifts) = single_column(&values, 0.0);
        let slopes = compute_slopes(&vol);
        let out = interpolate_stack(&vol, &shifts, Some(&slopes)).unwrap();
        let expected: Vec<f32> = values[..5].iter().map(|&v| v as f32).collect();
        assert_eq!(column_of(&out), expected);
    }

    #[test]
    fn cubic_stays_within_monotone_bracket() {
        let values = [0.0, 1.0, 3.0, 4.0, 6.0, 7.0];
        for k in 1..10 {
            let a = k as f64 / 10.0;
            let (vol, shifts) = single_column(&values, a);
            let slopes = compute_slopes(&vol);
            let out = interpolate_stack(&vol, &shifts, Some(&slopes)).unwrap();
            for (s, v) in column_of(&out).into_iter().enumerate() {
                let (lo, hi) = (values[s] as f32, values[s + 1] as f32);
                assert!(v >= lo - 1e-4 && v <= hi + 1e-4, "a={} s={} v={}", a, s + 1, v);
            }
        }
    }

    #[test]
    fn cubic_keeps_plateaus_flat() {
        let values = [0.0, 5.0, 5.0, 5.0, 10.0];
        let (vol, shifts) = single_column(&values, 0.6);
        let slopes = compute_slopes(&vol);
        let out = interpolate_stack(&vol, &shifts, Some(&slopes)).unwrap();
        assert_abs_diff_eq!(out.get(0, 0, 2), 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.get(0, 0, 3), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn cubic_on_a_ramp_matches_linear_away_from_the_end() {
        let values = [1.0, 3.0, 5.0, 7.0, 9.0];
        let (vol, shifts) = single_column(&values, 0.5);
        let slopes = compute_slopes(&vol);
        let cubic = interpolate_stack(&vol, &shifts, Some(&slopes)).unwrap();
        let linear = interpolate_stack(&vol, &shifts, None).unwrap();
        for s in 1..=2 {
            assert_abs_diff_eq!(cubic.get(0, 0, s), linear.get(0, 0, s), epsilon = 1e-6);
        }
    }

    #[test]
    fn single_slice_volume_is_rejected() {
        let (vol, shifts) = single_column(&[4.0], 0.5);
        assert!(matches!(
            interpolate_stack(&vol, &shifts, None),
            Err(FlattenError::EmptyStack { .. })
        ));
    }

    #[test]
    fn slope_shape_must_match_volume() {
        let (vol, shifts) = single_column(&[1.0, 2.0, 3.0], 0.5);
        let other = ShiftedVolume::from_columns(1, 1, 4, vec![0.0; 4]).unwrap();
        let slopes = compute_slopes(&other);
        assert!(matches!(
            interpolate_stack(&vol, &shifts, Some(&slopes)),
            Err(FlattenError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn method_labels() {
        assert_eq!(InterpolationMethod::MonotoneCubic.label(), "Monotone Cubic");
        assert!(!InterpolationMethod::Linear.needs_slopes());
    }
}
