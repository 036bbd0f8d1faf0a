#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use fieldsmooth_grid as grid;

#[doc(inline)]
pub use fieldsmooth_filter as filter;

#[doc(inline)]
pub use fieldsmooth_io as io;

/// Load, smooth and write a grid file.
pub mod pipeline;
