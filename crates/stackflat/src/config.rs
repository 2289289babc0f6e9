use std::path::Path;

use crate::error::FlattenError;
use crate::interp::InterpolationMethod;
use crate::stack::SampleDepth;

/// Intensity window used to normalize samples into centroid weights.
///
/// Samples at or below `min` weigh 0, samples at or above `max` weigh 1,
/// linear in between.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdWindow {
    /// Lower intensity threshold.
    pub min: f64,
    /// Upper intensity threshold.
    pub max: f64,
}

impl Default for ThresholdWindow {
    fn default() -> Self {
        Self::full_range(SampleDepth::U8)
    }
}

impl ThresholdWindow {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `[0, full_scale]` for the given sample depth.
    pub fn full_range(depth: SampleDepth) -> Self {
        Self {
            min: 0.0,
            max: depth.full_scale(),
        }
    }

    /// Map a raw sample to a weight in `[0, 1]`.
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        if value < self.min {
            0.0
        } else if value > self.max {
            1.0
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }

    pub fn validate(&self) -> Result<(), FlattenError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min {
            return Err(FlattenError::InvalidThresholds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Full configuration for one flattening run.
///
/// Passed by reference into every stage; never mutated during a run.
///
/// JSON fields are the snake_case names below. The camelCase spellings
/// `interpolationMethod`, `smoothingSigma`, `emitHeightMap` and flat
/// `minThreshold` / `maxThreshold` keys are accepted as well. Missing
/// fields take defaults; unknown fields are an error.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "FlattenConfigFile")]
pub struct FlattenConfig {
    /// Resampling scheme used between integer-shifted slices.
    pub interpolation: InterpolationMethod,
    /// Intensity window for the centroid weights.
    pub threshold: ThresholdWindow,
    /// Standard deviation (pixels) of the height-map Gaussian smoothing.
    /// `0` disables smoothing.
    pub smoothing_sigma: f64,
    /// Return the smoothed height map alongside the flattened stack.
    pub emit_height_map: bool,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            interpolation: InterpolationMethod::Linear,
            threshold: ThresholdWindow::default(),
            smoothing_sigma: 10.0,
            emit_height_map: false,
        }
    }
}

/// On-disk shape of [`FlattenConfig`].
#[derive(serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FlattenConfigFile {
    #[serde(alias = "interpolationMethod")]
    interpolation: InterpolationMethod,
    threshold: Option<ThresholdWindow>,
    #[serde(alias = "minThreshold")]
    min_threshold: Option<f64>,
    #[serde(alias = "maxThreshold")]
    max_threshold: Option<f64>,
    #[serde(alias = "smoothingSigma")]
    smoothing_sigma: f64,
    #[serde(alias = "emitHeightMap")]
    emit_height_map: bool,
}

impl Default for FlattenConfigFile {
    fn default() -> Self {
        let defaults = FlattenConfig::default();
        Self {
            interpolation: defaults.interpolation,
            threshold: None,
            min_threshold: None,
            max_threshold: None,
            smoothing_sigma: defaults.smoothing_sigma,
            emit_height_map: defaults.emit_height_map,
        }
    }
}

impl From<FlattenConfigFile> for FlattenConfig {
    fn from(file: FlattenConfigFile) -> Self {
        // flat keys win over the nested window
        let mut threshold = file.threshold.unwrap_or_default();
        if let Some(min) = file.min_threshold {
            threshold.min = min;
        }
        if let Some(max) = file.max_threshold {
            threshold.max = max;
        }
        Self {
            interpolation: file.interpolation,
            threshold,
            smoothing_sigma: file.smoothing_sigma,
            emit_height_map: file.emit_height_map,
        }
    }
}

impl FlattenConfig {
    /// Defaults with the threshold window spanning the full range of `depth`.
    pub fn for_depth(depth: SampleDepth) -> Self {
        Self {
            threshold: ThresholdWindow::full_range(depth),
            ..Default::default()
        }
    }

    /// Parse a JSON config file without validating the values, for callers
    /// that adjust fields before a run.
    pub fn read_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Load and validate a configuration from a JSON file. Missing fields
    /// take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::read_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would divide by zero or invert the
    /// normalization.
    pub fn validate(&self) -> Result<(), FlattenError> {
        self.threshold.validate()?;
        if !self.smoothing_sigma.is_finite() || self.smoothing_sigma < 0.0 {
            return Err(FlattenError::InvalidSigma {
                sigma: self.smoothing_sigma,
            });
        }
        Ok(())
    }
}
