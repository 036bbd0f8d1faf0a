use argh::FromArgs;
use std::path::PathBuf;

use fieldsmooth::{
    filter::{filter::kernels::DEFAULT_TRUNCATE, filter::FilterConfig, BoundaryPolicy, ExecutionStrategy},
    io::DType,
    pipeline::{self, SmoothingFilter},
};

#[derive(FromArgs)]
/// Smooth a gridded field with a gaussian kernel
struct Args {
    /// path to the input grid (.grid or .json)
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the output grid (.grid or .json)
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// standard deviation of the kernel, in the units of the grid spacing
    #[argh(option)]
    sigma: f64,

    /// boundary policy: periodic or truncate
    #[argh(option, default = "BoundaryPolicy::Periodic")]
    boundary: BoundaryPolicy,

    /// kernel truncation, in units of sigma
    #[argh(option, default = "DEFAULT_TRUNCATE")]
    truncate: f64,

    /// number of worker threads, all cores by default
    #[argh(option)]
    threads: Option<usize>,

    /// precision of the output samples: f32 or f64, the input's by default
    #[argh(option)]
    precision: Option<DType>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = FilterConfig::new()
        .with_boundary(args.boundary)
        .with_truncate(args.truncate)
        .with_strategy(args.threads.map_or(ExecutionStrategy::Auto, ExecutionStrategy::Fixed));

    pipeline::run(
        &args.input,
        &args.output,
        &SmoothingFilter::Gaussian { sigma: args.sigma },
        &config,
        args.precision,
    )?;

    Ok(())
}
