/// An error type for grid construction and validation.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GridError {
    /// The number of samples does not match the shape.
    #[error("Shape mismatch: expected {expected} samples for shape, but got {actual} samples in data")]
    InvalidShape {
        /// Number of samples implied by the shape
        expected: usize,
        /// Number of samples provided
        actual: usize,
    },

    /// One of the axes has no samples.
    #[error("Axis {axis} has zero extent")]
    ZeroExtent {
        /// The offending axis
        axis: usize,
    },

    /// The spacing along an axis is not a finite positive number.
    #[error("Invalid spacing {value} along axis {axis}: spacing must be finite and positive")]
    InvalidSpacing {
        /// The offending axis
        axis: usize,
        /// The rejected spacing
        value: f64,
    },

    /// The number of samples implied by the shape does not fit in `usize`.
    #[error("Shape {0:?} holds more samples than can be addressed")]
    ShapeOverflow(Vec<usize>),

    /// Only 1, 2 and 3 dimensional grids are supported.
    #[error("Unsupported grid dimensionality {0}: expected 1, 2 or 3")]
    UnsupportedDimension(usize),

    /// Per-axis metadata does not have one entry per axis.
    #[error("Dimension mismatch: expected {expected} entries, got {actual}")]
    DimensionMismatch {
        /// Expected number of entries
        expected: usize,
        /// Actual number of entries
        actual: usize,
    },

    /// Offset exceeds the number of samples.
    #[error("Offset {offset} out of bounds for grid with {numel} samples")]
    OffsetOutOfBounds {
        /// The requested offset
        offset: usize,
        /// Total number of samples
        numel: usize,
    },
}
