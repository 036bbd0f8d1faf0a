use std::{path::Path, time::Instant};

use fieldsmooth_filter::{
    filter::{gaussian_filter, tophat_filter, FilterConfig},
    FilterError,
};
use fieldsmooth_grid::{AnyGrid, Grid, Sample};
use fieldsmooth_io::{
    functional::{read_grid, write_grid, GridFormat},
    DType, GridFile, IoError,
};

/// The kernel family and its smoothing scale, in the units of the grid spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothingFilter {
    /// Gaussian kernel with standard deviation `sigma`.
    Gaussian {
        /// The standard deviation.
        sigma: f64,
    },
    /// Flat kernel of half-width `radius`.
    TopHat {
        /// The half-width.
        radius: f64,
    },
}

impl SmoothingFilter {
    /// The family name recorded in output metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gaussian { .. } => "gaussian",
            Self::TopHat { .. } => "tophat",
        }
    }

    /// The smoothing scale.
    pub fn scale(&self) -> f64 {
        match *self {
            Self::Gaussian { sigma } => sigma,
            Self::TopHat { radius } => radius,
        }
    }

    /// Smooth a typed grid.
    pub fn apply<T: Sample, const N: usize>(
        &self,
        src: &Grid<T, N>,
        config: &FilterConfig,
    ) -> Result<Grid<T, N>, FilterError> {
        match *self {
            Self::Gaussian { sigma } => gaussian_filter(src, sigma, config),
            Self::TopHat { radius } => tophat_filter(src, radius, config),
        }
    }
}

/// An error raised while running the smoothing pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The kernel could not be built or applied.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The grid could not be read or written.
    #[error(transparent)]
    Io(#[from] IoError),
}

fn smooth_as<const N: usize>(
    src: &Grid<f64, N>,
    filter: &SmoothingFilter,
    config: &FilterConfig,
    dtype: DType,
) -> Result<Grid<f64, N>, FilterError> {
    match dtype {
        DType::F64 => filter.apply(src, config),
        DType::F32 => Ok(filter.apply(&src.cast::<f32>(), config)?.cast()),
    }
}

/// Smooth a grid whose dimensionality is only known at runtime.
///
/// # Arguments
///
/// * `src` - The grid to smooth.
/// * `filter` - The kernel family and scale.
/// * `config` - Boundary policy, execution strategy and kernel options.
/// * `dtype` - The sample precision the filter runs on.
pub fn smooth_any(
    src: &AnyGrid,
    filter: &SmoothingFilter,
    config: &FilterConfig,
    dtype: DType,
) -> Result<AnyGrid, FilterError> {
    Ok(match src {
        AnyGrid::D1(g) => smooth_as(g, filter, config, dtype)?.into(),
        AnyGrid::D2(g) => smooth_as(g, filter, config, dtype)?.into(),
        AnyGrid::D3(g) => smooth_as(g, filter, config, dtype)?.into(),
    })
}

/// Smooth a loaded grid file and annotate the result.
///
/// The input metadata is carried over; `filter`, `scale` and `boundary` entries are set,
/// plus `truncate` for the gaussian and `shape` for the top-hat. The result is stored
/// with `precision`, or with the input's precision when `None`.
pub fn smooth_file(
    file: &GridFile,
    filter: &SmoothingFilter,
    config: &FilterConfig,
    precision: Option<DType>,
) -> Result<GridFile, FilterError> {
    let dtype = precision.unwrap_or(file.dtype);
    let grid = smooth_any(&file.grid, filter, config, dtype)?;

    let mut out = GridFile {
        grid,
        dtype,
        metadata: file.metadata.clone(),
    }
    .with_metadata("filter", filter.name())
    .with_metadata("scale", filter.scale())
    .with_metadata("boundary", config.boundary());

    out = match filter {
        SmoothingFilter::Gaussian { .. } => out.with_metadata("truncate", config.truncate()),
        SmoothingFilter::TopHat { .. } => out.with_metadata("shape", config.tophat_shape()),
    };
    Ok(out)
}

/// Read `input`, smooth it and write the result to `output`.
///
/// Nothing is written when any step fails.
pub fn run(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    filter: &SmoothingFilter,
    config: &FilterConfig,
    precision: Option<DType>,
) -> Result<(), PipelineError> {
    let (input, output) = (input.as_ref(), output.as_ref());

    // reject an unusable output path before loading anything
    GridFormat::from_path(output)?;

    let file = read_grid(input)?;
    log::info!(
        "loaded {} grid {:?} with spacing {:?} from {}",
        file.dtype,
        file.grid.shape(),
        file.grid.spacing(),
        input.display()
    );

    let start = Instant::now();
    let smoothed = smooth_file(&file, filter, config, precision)?;
    log::info!(
        "{} smoothing at scale {} ({} boundary) took {:?}",
        filter.name(),
        filter.scale(),
        config.boundary(),
        start.elapsed()
    );

    write_grid(output, &smoothed)?;
    log::info!("wrote {} grid to {}", smoothed.dtype, output.display());

    Ok(())
}
