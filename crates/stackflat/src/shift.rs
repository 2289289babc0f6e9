//! Decompose per-pixel height offsets into whole-slice and fractional shifts.

use crate::error::FlattenError;
use crate::height::HeightMap;

/// Target depth every surface point is moved to: `floor(n_slices / 2)`.
pub fn target_height(n_slices: usize) -> f64 {
    (n_slices / 2) as f64
}

/// Per-pixel `(integer, fraction)` decomposition of `height - target`.
///
/// Invariant: `integer[i] as f64 + fraction[i] == height[i] - target` and
/// `0 <= fraction[i] < 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftField {
    width: usize,
    height: usize,
    target: f64,
    integer: Vec<i64>,
    fraction: Vec<f64>,
}

impl ShiftField {
    /// Assemble a field from precomputed row-major parts.
    pub fn from_parts(
        width: usize,
        height: usize,
        target: f64,
        integer: Vec<i64>,
        fraction: Vec<f64>,
    ) -> Result<Self, FlattenError> {
        let plane = width * height;
        if plane == 0 {
            return Err(FlattenError::EmptyStack {
                dims: [width, height, 1],
            });
        }
        if integer.len() != plane || fraction.len() != plane {
            return Err(FlattenError::ShapeMismatch {
                what: "shift field",
                expected: [width, height, 1],
                got: [integer.len().min(fraction.len()), 1, 1],
            });
        }
        Ok(Self {
            width,
            height,
            target,
            integer,
            fraction,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Depth the surface is flattened onto.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Whole-slice shift per pixel (row-major).
    pub fn integer(&self) -> &[i64] {
        &self.integer
    }

    /// Fractional remainder per pixel (row-major), in `[0, 1)`.
    pub fn fraction(&self) -> &[f64] {
        &self.fraction
    }

    /// `(integer, fraction)` at pixel `(x, y)`.
    pub fn at(&self, x: usize, y: usize) -> (i64, f64) {
        let idx = x + y * self.width;
        (self.integer[idx], self.fraction[idx])
    }

    pub(crate) fn check_plane(&self, width: usize, height: usize) -> Result<(), FlattenError> {
        crate::error::check_shape(
            "shift field",
            [width, height, 1],
            [self.width, self.height, 1],
        )
    }
}

/// Plan the shift that moves each pixel's height onto `target`.
///
/// No range check is applied here: shifts that push a whole column out of
/// the stack are left for the resampler to drop.
pub fn plan_shifts(heights: &HeightMap, target: f64) -> ShiftField {
    let n = heights.as_raw().len();
    let mut integer = Vec::with_capacity(n);
    let mut fraction = Vec::with_capacity(n);

    for &h in heights.as_raw() {
        let d = h as f64 - target;
        let mut whole = d.floor();
        let mut frac = d - whole;
        // Tiny negative offsets can round the remainder up to exactly 1.
        if frac >= 1.0 {
            whole += 1.0;
            frac = 0.0;
        }
        integer.push(whole as i64);
        fraction.push(frac);
    }

    ShiftField {
        width: heights.width(),
        height: heights.height(),
        target,
        integer,
        fraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn target_is_floor_of_half_depth() {
        assert_eq!(target_height(5), 2.0);
        assert_eq!(target_height(6), 3.0);
        assert_eq!(target_height(1), 0.0);
    }

    #[test]
    fn from_parts_rejects_empty_plane() {
        assert_eq!(
            ShiftField::from_parts(0, 0, 0.0, vec![], vec![]).unwrap_err(),
            FlattenError::EmptyStack { dims: [0, 0, 1] }
        );
        assert!(ShiftField::from_parts(1, 1, 0.0, vec![0], vec![0.5]).is_ok());
    }

    #[test]
    fn integral_offset_has_zero_fraction() {
        let map = HeightMap::filled(4, 4, 3.0);
        let field = plan_shifts(&map, 2.0);
        assert!(field.integer().iter().all(|&k| k == 1));
        assert!(field.fraction().iter().all(|&a| a == 0.0));
    }

    #[test]
    fn negative_offsets_round_toward_minus_infinity() {
        let map = HeightMap::new(2, 1, vec![1.25, 0.0]).unwrap();
        let field = plan_shifts(&map, 2.0);
        assert_eq!(field.at(0, 0), (-1, 0.25));
        assert_eq!(field.at(1, 0), (-2, 0.0));
    }

    #[test]
    fn remainder_never_reaches_one() {
        let map = HeightMap::new(1, 1, vec![-1.0e-30]).unwrap();
        let field = plan_shifts(&map, 0.0);
        let (k, a) = field.at(0, 0);
        assert!((0.0..1.0).contains(&a));
        assert_abs_diff_eq!(k as f64 + a, -1.0e-30, epsilon = 1e-12);
    }

    #[test]
    fn decomposition_reconstructs_offset() {
        let mut rng = StdRng::seed_from_u64(17);
        let values: Vec<f32> = (0..64 * 48).map(|_| rng.gen_range(-40.0..80.0)).collect();
        let map = HeightMap::new(64, 48, values).unwrap();
        let target = target_height(37);
        let field = plan_shifts(&map, target);

        for (i, &h) in map.as_raw().iter().enumerate() {
            let a = field.fraction()[i];
            assert!((0.0..1.0).contains(&a), "fraction {} out of [0, 1)", a);
            let rebuilt = field.integer()[i] as f64 + a;
            assert_abs_diff_eq!(rebuilt, h as f64 - target, epsilon = 1e-12);
        }
    }
}
