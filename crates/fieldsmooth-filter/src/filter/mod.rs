//! Filter operations
//!
//! This module provides the gaussian and top-hat smoothing filters and the convolution
//! engines they run on.

/// Filter kernels
pub mod kernels;

/// High level filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;

/// Non-separable filter operations
mod stencil_filter;
pub use stencil_filter::*;
