//! stackflat: flatten a curved surface embedded in a 3-D grayscale stack.
//!
//! Given a stack of 2-D intensity slices, the pipeline estimates for every
//! pixel the depth of a bright surface and re-samples the stack so that
//! surface lies flat at mid-depth. The stages are:
//!
//! 1. **Height**: intensity-weighted depth centroid per pixel column,
//!    weights from a thresholded intensity window.
//! 2. **Smooth**: isotropic Gaussian blur of the height map.
//! 3. **Shift**: split `height - floor(n/2)` into whole and fractional slices.
//! 4. **Resample**: move every column by its whole-slice shift, dropping
//!    voxels that leave the stack.
//! 5. **Slopes**: Fritsch–Carlson Hermite tangents along depth
//!    (monotone-cubic mode only).
//! 6. **Interpolate**: sample each column between consecutive slices at
//!    its fractional shift; the result is one slice shorter than the input.
//!
//! # Public API
//! - [`Flattener`] as the primary entry point
//! - [`FlattenConfig`] for tuning
//! - [`Stack`], [`HeightMap`] and the per-stage functions for callers that
//!   need only part of the pipeline

mod api;
mod config;
mod error;
mod height;
pub mod interp;
mod pipeline;
mod resample;
mod shift;
mod stack;
#[cfg(test)]
mod test_utils;

pub use api::Flattener;
pub use config::{FlattenConfig, ThresholdWindow};
pub use error::FlattenError;
pub use height::{estimate_height, smooth_height, GrayF32Image, HeightMap};
pub use interp::{compute_slopes, interpolate_stack, InterpolationMethod, SlopeVolume};
pub use pipeline::{estimate_smoothed_height, flatten, FlattenOutput, FlattenSummary};
pub use resample::{resample_integer_shift, ResampleStats, ShiftedVolume};
pub use shift::{plan_shifts, target_height, ShiftField};
pub use stack::{Gray16Image, SampleDepth, Stack};
