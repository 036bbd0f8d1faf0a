#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! A [`Grid`] is a contiguous, row-major array of samples with a fixed shape and a
//! physical spacing per axis. Grids of one, two or three dimensions are supported and
//! the dimensionality is checked at compile time through a const generic.
//!
//! ```rust
//! use fieldsmooth_grid::Grid;
//!
//! let grid = Grid::<f64, 2>::from_shape_fn([2, 3], [0.5, 0.5], |[i, j]| (i * 3 + j) as f64)
//!     .unwrap();
//! assert_eq!(grid.shape(), [2, 3]);
//! assert_eq!(grid.get([1, 2]), Some(&5.0));
//! ```
//!
//! When the dimensionality is only known at runtime (e.g. after reading a file) use
//! [`AnyGrid`].

/// Runtime-dimensional grid wrapper.
pub mod any;

/// Error types for the grid module.
pub mod error;

/// The lattice type and its layout helpers.
pub mod grid;

/// Sample precision abstraction.
pub mod sample;

pub use crate::any::AnyGrid;
pub use crate::error::GridError;
pub use crate::grid::{get_strides_from_shape, Grid, MAX_DIMS};
pub use crate::sample::Sample;

/// Type alias for a 1-dimensional grid.
pub type Grid1<T> = Grid<T, 1>;

/// Type alias for a 2-dimensional grid.
pub type Grid2<T> = Grid<T, 2>;

/// Type alias for a 3-dimensional grid.
pub type Grid3<T> = Grid<T, 3>;
