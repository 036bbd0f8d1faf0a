use fieldsmooth_grid::{Grid, Sample};

use super::{
    kernels::{self, Kernel1d, TopHatShape, DEFAULT_TRUNCATE},
    separable_filter_with_strategy, stencil_filter_with_strategy,
};
use crate::{boundary::BoundaryPolicy, error::FilterError, parallel::ExecutionStrategy};

/// Settings shared by the smoothing filters.
///
/// ```rust
/// use fieldsmooth_filter::{filter::FilterConfig, BoundaryPolicy, ExecutionStrategy};
///
/// let config = FilterConfig::new()
///     .with_boundary(BoundaryPolicy::TruncateRenormalize)
///     .with_strategy(ExecutionStrategy::Serial);
/// assert_eq!(config.boundary(), BoundaryPolicy::TruncateRenormalize);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    boundary: BoundaryPolicy,
    strategy: ExecutionStrategy,
    truncate: f64,
    tophat_shape: TopHatShape,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::default(),
            strategy: ExecutionStrategy::default(),
            truncate: DEFAULT_TRUNCATE,
            tophat_shape: TopHatShape::default(),
        }
    }
}

impl FilterConfig {
    /// Periodic boundaries, automatic execution, gaussian truncation at 4 sigma and a
    /// spherical top-hat.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the boundary policy.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the gaussian truncation, in units of sigma.
    pub fn with_truncate(mut self, truncate: f64) -> Self {
        self.truncate = truncate;
        self
    }

    /// Set the top-hat footprint.
    pub fn with_tophat_shape(mut self, shape: TopHatShape) -> Self {
        self.tophat_shape = shape;
        self
    }

    /// The boundary policy.
    pub fn boundary(&self) -> BoundaryPolicy {
        self.boundary
    }

    /// The execution strategy.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// The gaussian truncation, in units of sigma.
    pub fn truncate(&self) -> f64 {
        self.truncate
    }

    /// The top-hat footprint.
    pub fn tophat_shape(&self) -> TopHatShape {
        self.tophat_shape
    }
}

/// Build one gaussian kernel per axis, each sized to that axis' spacing.
pub fn gaussian_kernels<const N: usize>(
    sigma: f64,
    spacing: [f64; N],
    truncate: f64,
) -> Result<[Kernel1d; N], FilterError> {
    let mut out: [Kernel1d; N] = std::array::from_fn(|_| Kernel1d::identity());
    for (kernel, &dx) in out.iter_mut().zip(spacing.iter()) {
        *kernel = kernels::gaussian_kernel_1d(sigma, dx, truncate)?;
    }
    Ok(out)
}

/// Build one flat window per axis, each sized to that axis' spacing.
pub fn tophat_kernels<const N: usize>(
    radius: f64,
    spacing: [f64; N],
) -> Result<[Kernel1d; N], FilterError> {
    let mut out: [Kernel1d; N] = std::array::from_fn(|_| Kernel1d::identity());
    for (kernel, &dx) in out.iter_mut().zip(spacing.iter()) {
        *kernel = kernels::tophat_kernel_1d(radius, dx)?;
    }
    Ok(out)
}

/// Smooth a grid with a gaussian filter.
///
/// The filter runs as one 1-D pass per axis, equivalent to the full N-D gaussian.
///
/// # Arguments
///
/// * `src` - The source grid.
/// * `sigma` - The standard deviation, in the same units as the grid spacing.
/// * `config` - Boundary policy, execution strategy and truncation.
///
/// # Errors
///
/// Every kernel is validated before any convolution work starts, see
/// [`kernels::gaussian_kernel_1d`].
pub fn gaussian_filter<T: Sample, const N: usize>(
    src: &Grid<T, N>,
    sigma: f64,
    config: &FilterConfig,
) -> Result<Grid<T, N>, FilterError> {
    let kernels = gaussian_kernels(sigma, src.spacing(), config.truncate)?;
    log::debug!(
        "gaussian filter: sigma {} -> kernel radii {:?}",
        sigma,
        kernels.iter().map(Kernel1d::radius).collect::<Vec<_>>()
    );
    separable_filter_with_strategy(src, &kernels, config.boundary, config.strategy)
}

/// Smooth a grid with a top-hat filter.
///
/// With [`TopHatShape::Box`] the filter is a separable product of flat windows. With
/// [`TopHatShape::Sphere`] every lattice offset within `radius` gets the same weight;
/// on 1-D grids both footprints coincide and the separable path is taken.
///
/// # Arguments
///
/// * `src` - The source grid.
/// * `radius` - The half-width, in the same units as the grid spacing.
/// * `config` - Boundary policy, execution strategy and top-hat footprint.
pub fn tophat_filter<T: Sample, const N: usize>(
    src: &Grid<T, N>,
    radius: f64,
    config: &FilterConfig,
) -> Result<Grid<T, N>, FilterError> {
    match config.tophat_shape {
        TopHatShape::Sphere if N > 1 => {
            let stencil = kernels::tophat_stencil(radius, src.spacing())?;
            log::debug!(
                "top-hat filter: radius {} -> {} taps, extent {:?}",
                radius,
                stencil.len(),
                stencil.radius()
            );
            stencil_filter_with_strategy(src, &stencil, config.boundary, config.strategy)
        }
        _ => {
            let kernels = tophat_kernels(radius, src.spacing())?;
            log::debug!(
                "top-hat filter: radius {} -> window half-widths {:?}",
                radius,
                kernels.iter().map(Kernel1d::radius).collect::<Vec<_>>()
            );
            separable_filter_with_strategy(src, &kernels, config.boundary, config.strategy)
        }
    }
}
