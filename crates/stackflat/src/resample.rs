//! Whole-slice shift of every pixel column.
//!
//! The shifted volume is stored depth-contiguous (`idx * n_slices + (s - 1)`)
//! so each pixel column is one disjoint chunk for the per-column stages that
//! follow.

use rayon::prelude::*;

use crate::error::FlattenError;
use crate::shift::ShiftField;
use crate::stack::Stack;

/// Voxel bookkeeping of one integer-shift pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResampleStats {
    /// Source voxels that landed inside the stack.
    pub written: usize,
    /// Source voxels whose destination fell outside `1..=n_slices`.
    pub dropped: usize,
    /// Pixel columns that received no voxel at all.
    pub empty_columns: usize,
}

/// Integer-shifted copy of a [`Stack`], zero where nothing landed.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftedVolume {
    width: usize,
    height: usize,
    n_slices: usize,
    data: Vec<f64>,
    stats: ResampleStats,
}

impl ShiftedVolume {
    /// Build a volume from depth-contiguous columns (`idx * n_slices + (s - 1)`).
    ///
    /// A volume without pixels or slices is rejected as [`FlattenError::EmptyStack`].
    pub fn from_columns(
        width: usize,
        height: usize,
        n_slices: usize,
        data: Vec<f64>,
    ) -> Result<Self, FlattenError> {
        if width * height == 0 || n_slices == 0 {
            return Err(FlattenError::EmptyStack {
                dims: [width, height, n_slices],
            });
        }
        if data.len() != width * height * n_slices {
            return Err(FlattenError::ShapeMismatch {
                what: "shifted volume",
                expected: [width, height, n_slices],
                got: [data.len(), 1, 1],
            });
        }
        Ok(Self {
            width,
            height,
            n_slices,
            data,
            stats: ResampleStats::default(),
        })
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

    /// `[width, height, n_slices]`.
    pub fn dims(&self) -> [usize; 3] {
        [self.width, self.height, self.n_slices]
    }

    /// Depth profile of pixel `idx = x + y * width`, slice 1 first.
    pub fn column(&self, idx: usize) -> &[f64] {
        &self.data[idx * self.n_slices..(idx + 1) * self.n_slices]
    }

    /// Sample at pixel `(x, y)` of slice `s` (1-based).
    pub fn get(&self, x: usize, y: usize, s: usize) -> f64 {
        self.column(x + y * self.width)[s - 1]
    }

    pub fn stats(&self) -> ResampleStats {
        self.stats
    }

    pub(crate) fn par_columns(&self) -> rayon::slice::ChunksExact<'_, f64> {
        self.data.par_chunks_exact(self.n_slices)
    }
}

/// Move every voxel `(x, y, s)` to slice `s - shift[x, y]`.
///
/// Destinations outside `1..=n_slices` are discarded, not clamped and not
/// wrapped; slices no voxel lands on stay zero.
pub fn resample_integer_shift(
    stack: &Stack,
    shifts: &ShiftField,
) -> Result<ShiftedVolume, FlattenError> {
    shifts.check_plane(stack.width(), stack.height())?;

    let n = stack.n_slices();
    let plane = stack.plane_len();
    let src = stack.as_raw();
    let mut data = vec![0.0f64; plane * n];

    let (written, empty_columns) = data
        .par_chunks_exact_mut(n)
        .zip(shifts.integer().par_iter())
        .enumerate()
        .map(|(idx, (column, &k))| {
            let mut written = 0usize;
            for s in 1..=n {
                let dest = (s as i64).saturating_sub(k);
                if dest >= 1 && dest <= n as i64 {
                    column[(dest - 1) as usize] = src[(s - 1) * plane + idx] as f64;
                    written += 1;
                }
            }
            (written, usize::from(written == 0))
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    let stats = ResampleStats {
        written,
        dropped: plane * n - written,
        empty_columns,
    };

    Ok(ShiftedVolume {
        width: stack.width(),
        height: stack.height(),
        n_slices: n,
        data,
        stats,
    })
}
