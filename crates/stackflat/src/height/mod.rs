//! Per-pixel surface height: weighted-centroid estimate and smoothing.
//!
//! A [`HeightMap`] stores one depth coordinate per pixel column, in
//! slice-index units (1-based, so any pixel with signal has height >= 1).
//! A height of exactly `0` marks a pixel that had no weight in any slice.

mod estimate;
mod smooth;

use image::{ImageBuffer, Luma};

use crate::error::FlattenError;

pub use estimate::estimate_height;
pub use smooth::smooth_height;

/// Single-channel `f32` image, the buffer type the blur primitive works on.
pub type GrayF32Image = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Row-major `width × height` map of depth coordinates.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HeightMap {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) values: Vec<f32>,
}

impl HeightMap {
    /// Wrap a row-major buffer of `width * height` heights.
    pub fn new(width: usize, height: usize, values: Vec<f32>) -> Result<Self, FlattenError> {
        if width == 0 || height == 0 {
            return Err(FlattenError::EmptyStack {
                dims: [width, height, 1],
            });
        }
        if values.len() != width * height {
            return Err(FlattenError::ShapeMismatch {
                what: "height map",
                expected: [width, height, 1],
                got: [values.len(), 1, 1],
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Map with every pixel at `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `[width, height]`.
    pub fn dims(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[x + y * self.width]
    }

    pub fn as_raw(&self) -> &[f32] {
        &self.values
    }

    pub fn into_raw(self) -> Vec<f32> {
        self.values
    }

    /// Number of pixels that fell back to height 0 (no weight in any slice).
    pub fn n_empty(&self) -> usize {
        self.values.iter().filter(|&&v| v == 0.0).count()
    }

    /// `(min, max)` over all pixels, ignoring non-finite values.
    pub fn range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub(crate) fn into_image(self) -> GrayF32Image {
        let (w, h) = (self.width as u32, self.height as u32);
        // Length is an invariant of the type.
        GrayF32Image::from_raw(w, h, self.values).unwrap_or_else(|| GrayF32Image::new(w, h))
    }

    pub(crate) fn from_image(image: GrayF32Image) -> Self {
        let (w, h) = image.dimensions();
        Self {
            width: w as usize,
            height: h as usize,
            values: image.into_raw(),
        }
    }
}
