//! Top-level pipeline orchestrator:
//! estimate → smooth → plan → resample → (slopes) → interpolate.

use std::time::Instant;

use super::{FlattenOutput, FlattenSummary};
use crate::config::FlattenConfig;
use crate::error::FlattenError;
use crate::height::{estimate_height, smooth_height, HeightMap};
use crate::interp::{compute_slopes, interpolate_stack};
use crate::resample::resample_integer_shift;
use crate::shift::{plan_shifts, target_height};
use crate::stack::Stack;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}

/// Raw centroid heights followed by Gaussian smoothing.
pub fn estimate_smoothed_height(
    stack: &Stack,
    config: &FlattenConfig,
) -> Result<HeightMap, FlattenError> {
    config.validate()?;

    let t0 = Instant::now();
    let raw = estimate_height(stack, &config.threshold)?;
    let n_empty = raw.n_empty();
    tracing::debug!(
        n_empty,
        elapsed_ms = elapsed_ms(t0),
        "height estimate complete"
    );
    if n_empty == raw.as_raw().len() {
        tracing::warn!(
            min = config.threshold.min,
            "no sample exceeds the lower threshold; every height fell back to 0"
        );
    }

    let t0 = Instant::now();
    let smoothed = smooth_height(raw, config.smoothing_sigma)?;
    tracing::debug!(
        sigma = config.smoothing_sigma,
        elapsed_ms = elapsed_ms(t0),
        "height smoothing complete"
    );
    Ok(smoothed)
}

/// Flatten `stack` so its weighted-centroid surface lies at mid-depth.
///
/// Validates the configuration and stack shape before any stage runs and
/// only returns buffers once every stage has succeeded.
pub fn flatten(stack: &Stack, config: &FlattenConfig) -> Result<FlattenOutput, FlattenError> {
    config.validate()?;
    let [w, h, n] = stack.dims();
    if n < 2 {
        return Err(FlattenError::EmptyStack { dims: stack.dims() });
    }
    tracing::info!(
        "Flattening {}x{}x{} stack ({} interpolation)",
        w,
        h,
        n,
        config.interpolation.label()
    );

    let heights = estimate_smoothed_height(stack, config)?;
    let empty_height_pixels = heights.n_empty();
    let height_range = heights.range().map(|(lo, hi)| [lo, hi]);

    let target = target_height(n);
    let shifts = plan_shifts(&heights, target);

    let t0 = Instant::now();
    let volume = resample_integer_shift(stack, &shifts)?;
    let stats = volume.stats();
    tracing::debug!(
        written = stats.written,
        dropped = stats.dropped,
        elapsed_ms = elapsed_ms(t0),
        "integer shift complete"
    );
    if stats.empty_columns > 0 {
        tracing::warn!(
            empty_columns = stats.empty_columns,
            "shift pushed every voxel of some pixel columns out of the stack; they stay zero"
        );
    }

    let t0 = Instant::now();
    let slopes = config
        .interpolation
        .needs_slopes()
        .then(|| compute_slopes(&volume));
    let flattened = interpolate_stack(&volume, &shifts, slopes.as_ref())?.with_depth(stack.depth());
    tracing::debug!(elapsed_ms = elapsed_ms(t0), "interpolation complete");

    let summary = FlattenSummary {
        input_size: [w, h, n],
        output_slices: flattened.n_slices(),
        target_height: target,
        interpolation: config.interpolation,
        threshold: config.threshold,
        smoothing_sigma: config.smoothing_sigma,
        empty_height_pixels,
        height_range,
        resample: stats,
    };
    tracing::info!(
        "Flattened onto slice {} ({} voxels dropped)",
        target,
        stats.dropped
    );

    Ok(FlattenOutput {
        stack: flattened,
        height_map: config.emit_height_map.then_some(heights),
        summary,
    })
}
