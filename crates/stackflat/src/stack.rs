//! Input image stack: a contiguous slice-major `w × h × n_slices` buffer.
//!
//! Slices are addressed 1-based (`1..=n_slices`), matching the depth
//! coordinate the height estimator reports. Pixels inside a slice are
//! row-major, `idx = x + y * width`.

use image::{GrayImage, ImageBuffer, Luma};

use crate::error::{check_shape, FlattenError};

/// Bit depth of the samples a stack was captured with.
///
/// Only used to choose defaults (full-scale threshold, output quantization);
/// the stack itself always stores `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleDepth {
    /// 8-bit unsigned samples.
    #[default]
    U8,
    /// 16-bit unsigned samples.
    U16,
    /// Floating-point samples normalized to `[0, 1]`.
    F32,
}

impl SampleDepth {
    /// Largest representable intensity for this depth.
    pub fn full_scale(self) -> f64 {
        match self {
            Self::U8 => 255.0,
            Self::U16 => 65535.0,
            Self::F32 => 1.0,
        }
    }
}

/// 16-bit grayscale slice.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Immutable 3-D grayscale stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    width: usize,
    height: usize,
    n_slices: usize,
    depth: SampleDepth,
    data: Vec<f32>,
}

impl Stack {
    /// Wrap a slice-major buffer of `width * height * n_slices` samples.
    pub fn new(
        width: usize,
        height: usize,
        n_slices: usize,
        data: Vec<f32>,
    ) -> Result<Self, FlattenError> {
        if width == 0 || height == 0 || n_slices == 0 {
            return Err(FlattenError::EmptyStack {
                dims: [width, height, n_slices],
            });
        }
        let plane = width * height;
        if data.len() != plane * n_slices {
            return Err(FlattenError::ShapeMismatch {
                what: "stack buffer",
                expected: [width, height, n_slices],
                got: [width, height, data.len() / plane],
            });
        }
        Ok(Self {
            width,
            height,
            n_slices,
            depth: SampleDepth::F32,
            data,
        })
    }

    /// Build a stack from per-slice row-major buffers.
    pub fn from_slices(
        width: usize,
        height: usize,
        slices: Vec<Vec<f32>>,
    ) -> Result<Self, FlattenError> {
        let n_slices = slices.len();
        let plane = width * height;
        let mut data = Vec::with_capacity(plane * n_slices);
        for slice in &slices {
            if slice.len() != plane {
                return Err(FlattenError::ShapeMismatch {
                    what: "stack slice",
                    expected: [width, height, 1],
                    got: [slice.len() % width.max(1), slice.len() / width.max(1), 1],
                });
            }
            data.extend_from_slice(slice);
        }
        Self::new(width, height, n_slices, data)
    }

    /// Build a stack from 8-bit grayscale slices, all of identical size.
    pub fn from_gray8(slices: &[GrayImage]) -> Result<Self, FlattenError> {
        let mut stack = Self::from_luma(slices)?;
        stack.depth = SampleDepth::U8;
        Ok(stack)
    }

    /// Build a stack from 16-bit grayscale slices, all of identical size.
    pub fn from_gray16(slices: &[Gray16Image]) -> Result<Self, FlattenError> {
        let mut stack = Self::from_luma(slices)?;
        stack.depth = SampleDepth::U16;
        Ok(stack)
    }

    fn from_luma<T>(slices: &[ImageBuffer<Luma<T>, Vec<T>>]) -> Result<Self, FlattenError>
    where
        T: image::Primitive + Into<f32>,
    {
        let (w, h) = slices
            .first()
            .map(|s| (s.width() as usize, s.height() as usize))
            .unwrap_or((0, 0));
        let mut data = Vec::with_capacity(w * h * slices.len());
        for slice in slices {
            check_shape(
                "stack slice",
                [w, h, 1],
                [slice.width() as usize, slice.height() as usize, 1],
            )?;
            data.extend(slice.as_raw().iter().map(|&v| v.into()));
        }
        Self::new(w, h, slices.len(), data)
    }

    /// Override the recorded sample depth.
    pub fn with_depth(mut self, depth: SampleDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn n_slices(&self) -> usize {
        self.n_slices
    }

    /// Sample depth the stack was captured with.
    pub fn depth(&self) -> SampleDepth {
        self.depth
    }

    /// `[width, height, n_slices]`.
    pub fn dims(&self) -> [usize; 3] {
        [self.width, self.height, self.n_slices]
    }

    /// Number of pixels per slice.
    pub fn plane_len(&self) -> usize {
        self.width * self.height
    }

    /// Slice `s` (1-based) as a row-major pixel buffer.
    ///
    /// Panics if `s` is outside `1..=n_slices`.
    pub fn slice(&self, s: usize) -> &[f32] {
        assert!(
            (1..=self.n_slices).contains(&s),
            "slice {} out of range 1..={}",
            s,
            self.n_slices
        );
        let plane = self.plane_len();
        &self.data[(s - 1) * plane..s * plane]
    }

    /// Sample at pixel `(x, y)` of slice `s` (1-based).
    pub fn get(&self, x: usize, y: usize, s: usize) -> f32 {
        self.slice(s)[x + y * self.width]
    }

    /// Iterate slices in depth order.
    pub fn slices(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.plane_len())
    }

    /// Whole slice-major buffer.
    pub fn as_raw(&self) -> &[f32] {
        &self.data
    }
}
