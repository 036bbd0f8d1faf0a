#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Binary grid files.
///
/// Compact bincode encoding holding the samples in their stored precision.
/// See [`binary::read_grid_binary`] and [`binary::write_grid_binary`].
pub mod binary;

/// Error types for I/O operations.
pub mod error;

/// High-level grid reading and writing functions.
///
/// Picks the format from the file extension, see [`functional::read_grid`].
pub mod functional;

/// JSON grid files.
///
/// Human readable, meant for small fields and tests.
pub mod json;

/// Grid file contents besides the samples: precision and free-form metadata.
pub mod metadata;

pub use crate::error::IoError;
pub use crate::metadata::{DType, GridFile, GridMetadata};
