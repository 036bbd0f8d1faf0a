#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// boundary handling policies.
pub mod boundary;

/// error types for the filter module.
pub mod error;

/// smoothing filters: kernels, convolution engines and high level operations.
pub mod filter;

/// module containing parallelization utilities.
pub mod parallel;

pub use crate::boundary::BoundaryPolicy;
pub use crate::error::FilterError;
pub use crate::parallel::ExecutionStrategy;
