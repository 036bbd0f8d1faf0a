use fieldsmooth_grid::GridError;

/// An error type for kernel construction and filtering.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The smoothing scale (sigma or radius) is not finite and positive.
    #[error("Invalid smoothing scale {0}: the scale must be finite and positive")]
    InvalidScale(f64),

    /// The grid spacing handed to a kernel builder is not finite and positive.
    #[error("Invalid grid spacing {0}: the spacing must be finite and positive")]
    InvalidSpacing(f64),

    /// The gaussian truncation factor is not finite and positive.
    #[error("Invalid truncation factor {0}: the factor must be finite and positive")]
    InvalidTruncate(f64),

    /// The kernel would not reach a single neighbouring sample.
    #[error("Degenerate kernel: the scale spans {reach} samples at spacing {spacing}, the kernel would not cover any neighbour")]
    DegenerateKernel {
        /// Kernel reach in units of samples
        reach: f64,
        /// The grid spacing along the offending axis
        spacing: f64,
    },

    /// The kernel radius exceeds the supported maximum.
    #[error("Kernel radius {radius} exceeds the maximum of {max} samples")]
    KernelTooLarge {
        /// Requested radius in samples
        radius: usize,
        /// Largest supported radius in samples
        max: usize,
    },

    /// A non-separable stencil would span too many lattice offsets.
    #[error("Stencil with half-widths {half_widths:?} spans more than {max} offsets")]
    StencilTooLarge {
        /// Half-width along each axis, in samples
        half_widths: Vec<usize>,
        /// Largest supported number of offsets
        max: usize,
    },

    /// Kernels must have an odd, non-zero number of taps.
    #[error("Invalid kernel length {0}: kernels must have an odd, non-zero number of taps")]
    InvalidKernelLength(usize),

    /// The kernel weights cannot be normalized to sum to one.
    #[error("Kernel weights sum to {0} and cannot be normalized")]
    InvalidWeights(f64),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    /// The output grid could not be assembled.
    #[error(transparent)]
    Grid(#[from] GridError),
}
