use crate::{error::GridError, sample::Sample};

/// Largest supported dimensionality.
pub const MAX_DIMS: usize = 3;

/// Computes the strides for a row-major (C-contiguous) layout.
///
/// The rightmost axis has stride 1 and each axis' stride is the product of the
/// extents to its right.
///
/// # Examples
///
/// ```rust
/// use fieldsmooth_grid::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape([2, 3]), [3, 1]);
/// assert_eq!(get_strides_from_shape([2, 3, 4]), [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// Checks the layout and returns the number of samples it holds.
fn validate_layout<const N: usize>(
    shape: [usize; N],
    spacing: [f64; N],
) -> Result<usize, GridError> {
    if N == 0 || N > MAX_DIMS {
        return Err(GridError::UnsupportedDimension(N));
    }
    if let Some(axis) = shape.iter().position(|&extent| extent == 0) {
        return Err(GridError::ZeroExtent { axis });
    }
    for (axis, &value) in spacing.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(GridError::InvalidSpacing { axis, value });
        }
    }
    shape
        .iter()
        .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
        .ok_or_else(|| GridError::ShapeOverflow(shape.to_vec()))
}

/// A scalar field sampled on a uniform lattice.
///
/// The samples are stored contiguously in row-major order. The shape and the physical
/// spacing between adjacent samples are fixed once the grid is built; operations that
/// transform the samples return a new grid.
///
/// # Type Parameters
///
/// * `T` - The sample type.
/// * `N` - The number of dimensions (1, 2 or 3).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T, const N: usize> {
    data: Vec<T>,
    shape: [usize; N],
    strides: [usize; N],
    spacing: [f64; N],
}

impl<T, const N: usize> Grid<T, N> {
    /// Creates a new grid from its shape, spacing and samples.
    ///
    /// # Arguments
    ///
    /// * `shape` - The number of samples along each axis.
    /// * `spacing` - The physical distance between adjacent samples along each axis.
    /// * `data` - The samples in row-major order.
    ///
    /// # Errors
    ///
    /// Fails if the dimensionality is unsupported, an extent is zero, a spacing is not
    /// finite and positive, or `data` does not hold exactly one sample per lattice site.
    pub fn new(shape: [usize; N], spacing: [f64; N], data: Vec<T>) -> Result<Self, GridError> {
        let numel = validate_layout(shape, spacing)?;
        if numel != data.len() {
            return Err(GridError::InvalidShape {
                expected: numel,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            shape,
            strides: get_strides_from_shape(shape),
            spacing,
        })
    }

    /// Creates a grid with unit spacing along every axis.
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>) -> Result<Self, GridError> {
        Self::new(shape, [1.0; N], data)
    }

    /// Creates a grid filled with a single value.
    ///
    /// # Example
    ///
    /// ```
    /// use fieldsmooth_grid::Grid;
    ///
    /// let g = Grid::<f64, 2>::from_shape_val([2, 2], [1.0, 1.0], 3.0).unwrap();
    /// assert_eq!(g.as_slice(), &[3.0, 3.0, 3.0, 3.0]);
    /// ```
    pub fn from_shape_val(shape: [usize; N], spacing: [f64; N], value: T) -> Result<Self, GridError>
    where
        T: Clone,
    {
        let numel = validate_layout(shape, spacing)?;
        Self::new(shape, spacing, vec![value; numel])
    }

    /// Creates a grid by evaluating `f` at every lattice index.
    pub fn from_shape_fn<F>(shape: [usize; N], spacing: [f64; N], f: F) -> Result<Self, GridError>
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = validate_layout(shape, spacing)?;
        let data = (0..numel)
            .map(|i| {
                let mut index = [0; N];
                let mut j = i;
                for k in (0..N).rev() {
                    index[k] = j % shape[k];
                    j /= shape[k];
                }
                f(index)
            })
            .collect();
        Self::new(shape, spacing, data)
    }

    /// Returns a copy of the layout of this grid holding `data` instead.
    ///
    /// Used by filters to wrap their output with the input's shape and spacing.
    pub fn with_data<U>(&self, data: Vec<U>) -> Result<Grid<U, N>, GridError> {
        Grid::new(self.shape, self.spacing, data)
    }

    /// Replaces the spacing, keeping the samples.
    pub fn with_spacing(self, spacing: [f64; N]) -> Result<Self, GridError> {
        Self::new(self.shape, spacing, self.data)
    }

    /// The number of samples along each axis.
    #[inline]
    pub fn shape(&self) -> [usize; N] {
        self.shape
    }

    /// The row-major strides of the sample buffer.
    #[inline]
    pub fn strides(&self) -> [usize; N] {
        self.strides
    }

    /// The physical spacing along each axis.
    #[inline]
    pub fn spacing(&self) -> [f64; N] {
        self.spacing
    }

    /// The number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        N
    }

    /// The total number of samples.
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// The samples in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consumes the grid and returns the samples.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Iterates over the samples in row-major order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Returns true if both grids have the same shape and spacing.
    pub fn same_layout<U>(&self, other: &Grid<U, N>) -> bool {
        self.shape == other.shape && self.spacing == other.spacing
    }

    /// Offset of the sample at `index`, or `None` if the index is out of bounds.
    pub fn get_iter_offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, dim_size), stride) in index.iter().zip(self.shape).zip(self.strides) {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Lattice index of the sample at `offset`. The reverse of [`Self::get_iter_offset`].
    pub fn get_index(&self, offset: usize) -> Result<[usize; N], GridError> {
        let numel = self.numel();
        if offset >= numel {
            return Err(GridError::OffsetOutOfBounds { offset, numel });
        }
        let mut index = [0; N];
        let mut rem = offset;
        for (axis, &stride) in self.strides.iter().enumerate() {
            index[axis] = rem / stride;
            rem %= stride;
        }
        Ok(index)
    }

    /// The sample at `index`, or `None` if the index is out of bounds.
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.get_iter_offset(index).map(|offset| &self.data[offset])
    }

    /// Applies `f` to every sample, keeping the layout.
    pub fn map<U, F>(&self, f: F) -> Grid<U, N>
    where
        F: Fn(&T) -> U,
    {
        Grid {
            data: self.data.iter().map(f).collect(),
            shape: self.shape,
            strides: self.strides,
            spacing: self.spacing,
        }
    }
}

impl<T: Sample, const N: usize> Grid<T, N> {
    /// Converts the samples to another precision.
    pub fn cast<U: Sample>(&self) -> Grid<U, N> {
        self.map(|&v| U::from_f64(v.to_f64()))
    }

    /// Sum of all samples, accumulated in `f64`.
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|v| v.to_f64()).sum()
    }

    /// Mean of all samples.
    pub fn mean(&self) -> f64 {
        self.sum() / self.numel() as f64
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .iter()
            .map(|v| v.to_f64())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }
}
