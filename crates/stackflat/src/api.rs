//! High-level flattening API.
//!
//! [`Flattener`] is the primary entry point. It wraps a [`FlattenConfig`]
//! and runs the full pipeline, or only the height estimate, on any number
//! of stacks.

use std::path::Path;

use crate::config::FlattenConfig;
use crate::error::FlattenError;
use crate::height::HeightMap;
use crate::pipeline::{self, FlattenOutput};
use crate::stack::Stack;

/// Primary flattening interface.
///
/// Create once, flatten many stacks.
///
/// # Examples
///
/// ```
/// use stackflat::{FlattenConfig, Flattener, Stack, ThresholdWindow};
///
/// // 2x2 pixels, 5 slices, bright plane on slice 3
/// let mut data = vec![0.0f32; 2 * 2 * 5];
/// data[2 * 4..3 * 4].fill(10.0);
/// let stack = Stack::new(2, 2, 5, data).unwrap();
///
/// let mut flattener = Flattener::with_config(FlattenConfig {
///     threshold: ThresholdWindow::new(5.0, 10.0),
///     smoothing_sigma: 0.0,
///     ..Default::default()
/// });
/// flattener.config_mut().emit_height_map = true;
///
/// let out = flattener.flatten(&stack).unwrap();
/// assert_eq!(out.stack.n_slices(), 4);
/// assert_eq!(out.stack.slice(2), &[10.0; 4]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    /// Create a flattener with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with full config control.
    pub fn with_config(config: FlattenConfig) -> Self {
        Self { config }
    }

    /// Load config JSON and create a flattener in one step.
    pub fn from_config_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_config(FlattenConfig::from_json_file(path)?))
    }

    /// Access the current configuration.
    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut FlattenConfig {
        &mut self.config
    }

    /// Run the full pipeline on `stack`.
    pub fn flatten(&self, stack: &Stack) -> Result<FlattenOutput, FlattenError> {
        pipeline::flatten(stack, &self.config)
    }

    /// Estimate and smooth the surface height without resampling the stack.
    pub fn height_map(&self, stack: &Stack) -> Result<HeightMap, FlattenError> {
        pipeline::estimate_smoothed_height(stack, &self.config)
    }
}
