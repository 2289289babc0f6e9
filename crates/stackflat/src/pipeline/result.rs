use crate::config::ThresholdWindow;
use crate::height::HeightMap;
use crate::interp::InterpolationMethod;
use crate::resample::ResampleStats;
use crate::stack::Stack;

/// Run summary, serializable for reports.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlattenSummary {
    /// Input dimensions `[width, height, n_slices]`.
    pub input_size: [usize; 3],
    /// Number of slices in the flattened stack (`n_slices - 1`).
    pub output_slices: usize,
    /// Depth the surface was moved to (1-based slice units).
    pub target_height: f64,
    /// Interpolation scheme used.
    pub interpolation: InterpolationMethod,
    /// Threshold window of the height estimate.
    pub threshold: ThresholdWindow,
    /// Height-map smoothing sigma (pixels).
    pub smoothing_sigma: f64,
    /// Pixels with no weight in any slice (height fell back to 0).
    pub empty_height_pixels: usize,
    /// `[min, max]` of the smoothed height map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_range: Option<[f32; 2]>,
    /// Integer-shift voxel accounting.
    pub resample: ResampleStats,
}

/// Everything a successful run hands back.
#[derive(Debug, Clone)]
pub struct FlattenOutput {
    /// Flattened stack, `n_slices - 1` slices deep.
    pub stack: Stack,
    /// Smoothed height map, present when `emit_height_map` was set.
    pub height_map: Option<HeightMap>,
    pub summary: FlattenSummary,
}
