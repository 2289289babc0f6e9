use rayon::prelude::*;

use super::HeightMap;
use crate::config::ThresholdWindow;
use crate::error::FlattenError;
use crate::stack::Stack;

/// Intensity-weighted depth centroid of every pixel column.
///
/// Each sample is mapped through `window` to a weight in `[0, 1]`; the
/// result is `Σ w·s / Σ w` over slices `s = 1..=n_slices`, or `0` when the
/// column carries no weight at all.
pub fn estimate_height(stack: &Stack, window: &ThresholdWindow) -> Result<HeightMap, FlattenError> {
    window.validate()?;

    let w = stack.width();
    let mut values = vec![0.0f32; stack.plane_len()];

    values.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let mut sum_weight = vec![0.0f64; w];
        let mut sum_weighted_depth = vec![0.0f64; w];

        for (k, slice) in stack.slices().enumerate() {
            let depth = (k + 1) as f64;
            let src = &slice[y * w..(y + 1) * w];
            for x in 0..w {
                let weight = window.normalize(src[x] as f64);
                sum_weight[x] += weight;
                sum_weighted_depth[x] += weight * depth;
            }
        }

        for x in 0..w {
            row[x] = if sum_weight[x] == 0.0 {
                0.0
            } else {
                (sum_weighted_depth[x] / sum_weight[x]) as f32
            };
        }
    });

    Ok(HeightMap {
        width: w,
        height: stack.height(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{surface_stack, uniform_column_stack};
    use approx::assert_abs_diff_eq;

    #[test]
    fn single_bright_slice_gives_its_index() {
        let stack = surface_stack(4, 4, 5, |_, _| 3, 10.0);
        let map = estimate_height(&stack, &ThresholdWindow::new(5.0, 10.0)).unwrap();
        assert!(map.as_raw().iter().all(|&h| h == 3.0));
    }

    #[test]
    fn all_below_min_falls_back_to_zero() {
        let stack = uniform_column_stack(3, 2, &[1.0, 2.0, 4.0, 1.0]);
        let map = estimate_height(&stack, &ThresholdWindow::new(5.0, 10.0)).unwrap();
        assert!(map.as_raw().iter().all(|&h| h == 0.0 && !h.is_nan()));
        assert_eq!(map.n_empty(), 6);
    }

    #[test]
    fn partial_weights_form_a_centroid() {
        // weights: slice 2 -> 0.5, slice 4 -> 1.0
        let stack = uniform_column_stack(2, 2, &[0.0, 7.5, 0.0, 20.0, 0.0]);
        let map = estimate_height(&stack, &ThresholdWindow::new(5.0, 10.0)).unwrap();
        let expected = (0.5 * 2.0 + 1.0 * 4.0) / 1.5;
        for &h in map.as_raw() {
            assert_abs_diff_eq!(h as f64, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn heights_follow_a_tilted_surface() {
        let stack = surface_stack(6, 3, 8, |x, _| 1 + x, 200.0);
        let map = estimate_height(&stack, &ThresholdWindow::new(0.0, 255.0)).unwrap();
        for y in 0..3 {
            for x in 0..6 {
                assert_eq!(map.get(x, y), (1 + x) as f32);
            }
        }
    }

    #[test]
    fn invalid_window_is_rejected_up_front() {
        let stack = uniform_column_stack(1, 1, &[1.0, 2.0]);
        assert_eq!(
            estimate_height(&stack, &ThresholdWindow::new(3.0, 3.0)),
            Err(FlattenError::InvalidThresholds { min: 3.0, max: 3.0 })
        );
    }
}
