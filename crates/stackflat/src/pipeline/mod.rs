//! Flattening pipeline.
//!
//! This module is the "glue" layer that wires the stages together:
//! height estimate -> smoothing -> shift planning -> integer shift ->
//! (Fritsch–Carlson slopes) -> fractional interpolation.
//!
//! The per-stage algorithms live in `crate::height`, `crate::shift`,
//! `crate::resample` and `crate::interp`; the pipeline layer owns call
//! order, validation up front and logging.

mod result;
mod run;

pub use result::{FlattenOutput, FlattenSummary};
pub use run::{estimate_smoothed_height, flatten};
