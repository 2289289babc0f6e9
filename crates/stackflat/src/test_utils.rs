//! Synthetic stacks shared by the unit tests.

use crate::stack::Stack;

/// Stack that is `value` on one slice per pixel and `0` elsewhere.
///
/// `surface(x, y)` returns the 1-based slice carrying the signal; anything
/// outside `1..=n_slices` leaves the column empty.
pub(crate) fn surface_stack<F>(w: usize, h: usize, n_slices: usize, surface: F, value: f32) -> Stack
where
    F: Fn(usize, usize) -> usize,
{
    let plane = w * h;
    let mut data = vec![0.0f32; plane * n_slices];
    for y in 0..h {
        for x in 0..w {
            let s = surface(x, y);
            if (1..=n_slices).contains(&s) {
                data[(s - 1) * plane + x + y * w] = value;
            }
        }
    }
    Stack::new(w, h, n_slices, data).expect("valid synthetic stack")
}

/// Stack where every pixel has the same depth profile `column`.
pub(crate) fn uniform_column_stack(w: usize, h: usize, column: &[f32]) -> Stack {
    let slices = column.iter().map(|&v| vec![v; w * h]).collect();
    Stack::from_slices(w, h, slices).expect("valid synthetic stack")
}

/// Stack with a distinct non-zero value per voxel: `1 + x + 10 y + 100 s`.
pub(crate) fn ramp_stack(w: usize, h: usize, n_slices: usize) -> Stack {
    let mut data = Vec::with_capacity(w * h * n_slices);
    for s in 1..=n_slices {
        for y in 0..h {
            for x in 0..w {
                data.push((1 + x + 10 * y + 100 * s) as f32);
            }
        }
    }
    Stack::new(w, h, n_slices, data).expect("valid synthetic stack")
}
