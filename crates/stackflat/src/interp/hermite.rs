//! Cubic Hermite basis on the unit interval.

#[inline]
pub fn h00(a: f64) -> f64 {
    (1.0 + 2.0 * a) * (1.0 - a) * (1.0 - a)
}

#[inline]
pub fn h10(a: f64) -> f64 {
    a * (1.0 - a) * (1.0 - a)
}

#[inline]
pub fn h01(a: f64) -> f64 {
    a * a * (3.0 - 2.0 * a)
}

#[inline]
pub fn h11(a: f64) -> f64 {
    a * a * (a - 1.0)
}

/// Straight-line blend of `y1` and `y2` at `a ∈ [0, 1)`.
#[inline]
pub fn lerp(y1: f64, y2: f64, a: f64) -> f64 {
    y1 * (1.0 - a) + y2 * a
}

/// Hermite segment through `(0, y1)` and `(1, y2)` with end tangents `m1`, `m2`.
#[inline]
pub fn hermite(y1: f64, y2: f64, m1: f64, m2: f64, a: f64) -> f64 {
    y1 * h00(a) + m1 * h10(a) + y2 * h01(a) + m2 * h11(a)
}
