//! Error taxonomy for the flattening pipeline.

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors that abort a flattening run before any output is exposed.
#[derive(Debug, Clone, PartialEq)]
pub enum FlattenError {
    /// The threshold window is empty, inverted or not finite.
    InvalidThresholds {
        /// Configured lower threshold.
        min: f64,
        /// Configured upper threshold.
        max: f64,
    },
    /// The smoothing standard deviation is negative or not finite.
    InvalidSigma {
        /// Configured sigma.
        sigma: f64,
    },
    /// A buffer handed between stages disagrees with the declared shape.
    ShapeMismatch {
        /// Which buffer failed the check.
        what: &'static str,
        /// Expected `[width, height, slices]`.
        expected: [usize; 3],
        /// Observed `[width, height, slices]`.
        got: [usize; 3],
    },
    /// The stack has no pixels, or fewer than two slices.
    EmptyStack {
        /// Observed `[width, height, slices]`.
        dims: [usize; 3],
    },
}

impl std::fmt::Display for FlattenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidThresholds { min, max } => {
                write!(
                    f,
                    "invalid threshold window: need finite min < max, got min={}, max={}",
                    min, max
                )
            }
            Self::InvalidSigma { sigma } => {
                write!(f, "invalid smoothing sigma {}: must be finite and >= 0", sigma)
            }
            Self::ShapeMismatch {
                what,
                expected,
                got,
            } => write!(
                f,
                "{} shape mismatch: expected {}x{}x{}, got {}x{}x{}",
                what, expected[0], expected[1], expected[2], got[0], got[1], got[2]
            ),
            Self::EmptyStack { dims } => write!(
                f,
                "stack {}x{}x{} is too small: need non-empty slices and at least 2 slices",
                dims[0], dims[1], dims[2]
            ),
        }
    }
}

impl std::error::Error for FlattenError {}

/// Fail with [`FlattenError::ShapeMismatch`] unless `got == expected`.
pub(crate) fn check_shape(
    what: &'static str,
    expected: [usize; 3],
    got: [usize; 3],
) -> Result<(), FlattenError> {
    if expected == got {
        Ok(())
    } else {
        Err(FlattenError::ShapeMismatch {
            what,
            expected,
            got,
        })
    }
}
