use crate::{error::GridError, grid::Grid};

/// A grid whose dimensionality is known only at runtime.
///
/// Samples are held in `f64`; file readers widen narrower payloads on load.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyGrid {
    /// A one-dimensional grid.
    D1(Grid<f64, 1>),
    /// A two-dimensional grid.
    D2(Grid<f64, 2>),
    /// A three-dimensional grid.
    D3(Grid<f64, 3>),
}

fn to_array<T: Copy, const N: usize>(values: &[T]) -> Result<[T; N], GridError> {
    values
        .try_into()
        .map_err(|_| GridError::DimensionMismatch {
            expected: N,
            actual: values.len(),
        })
}

impl AnyGrid {
    /// Builds a grid from per-axis metadata given as slices.
    ///
    /// # Errors
    ///
    /// Fails if `shape` has more than three or zero entries, if `spacing` does not
    /// have one entry per axis, or if the grid itself is invalid.
    pub fn from_parts(shape: &[usize], spacing: &[f64], data: Vec<f64>) -> Result<Self, GridError> {
        if spacing.len() != shape.len() {
            return Err(GridError::DimensionMismatch {
                expected: shape.len(),
                actual: spacing.len(),
            });
        }
        match shape.len() {
            1 => Ok(Self::D1(Grid::new(to_array(shape)?, to_array(spacing)?, data)?)),
            2 => Ok(Self::D2(Grid::new(to_array(shape)?, to_array(spacing)?, data)?)),
            3 => Ok(Self::D3(Grid::new(to_array(shape)?, to_array(spacing)?, data)?)),
            n => Err(GridError::UnsupportedDimension(n)),
        }
    }

    /// The number of dimensions.
    pub fn ndim(&self) -> usize {
        match self {
            Self::D1(_) => 1,
            Self::D2(_) => 2,
            Self::D3(_) => 3,
        }
    }

    /// The number of samples along each axis.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::D1(g) => g.shape().to_vec(),
            Self::D2(g) => g.shape().to_vec(),
            Self::D3(g) => g.shape().to_vec(),
        }
    }

    /// The physical spacing along each axis.
    pub fn spacing(&self) -> Vec<f64> {
        match self {
            Self::D1(g) => g.spacing().to_vec(),
            Self::D2(g) => g.spacing().to_vec(),
            Self::D3(g) => g.spacing().to_vec(),
        }
    }

    /// The samples in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::D1(g) => g.as_slice(),
            Self::D2(g) => g.as_slice(),
            Self::D3(g) => g.as_slice(),
        }
    }

    /// The total number of samples.
    pub fn numel(&self) -> usize {
        self.as_slice().len()
    }
}

impl From<Grid<f64, 1>> for AnyGrid {
    fn from(grid: Grid<f64, 1>) -> Self {
        Self::D1(grid)
    }
}

impl From<Grid<f64, 2>> for AnyGrid {
    fn from(grid: Grid<f64, 2>) -> Self {
        Self::D2(grid)
    }
}

impl From<Grid<f64, 3>> for AnyGrid {
    fn from(grid: Grid<f64, 3>) -> Self {
        Self::D3(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() -> Result<(), GridError> {
        let grid = AnyGrid::from_parts(&[2, 3], &[1.0, 0.5], vec![0.0; 6])?;
        assert_eq!(grid.ndim(), 2);
        assert_eq!(grid.shape(), vec![2, 3]);
        assert_eq!(grid.spacing(), vec![1.0, 0.5]);
        assert_eq!(grid.numel(), 6);
        Ok(())
    }

    #[test]
    fn test_from_parts_invalid() {
        assert_eq!(
            AnyGrid::from_parts(&[2, 3], &[1.0], vec![0.0; 6]),
            Err(GridError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            AnyGrid::from_parts(&[1, 1, 1, 1], &[1.0; 4], vec![0.0]),
            Err(GridError::UnsupportedDimension(4))
        );
        assert_eq!(
            AnyGrid::from_parts(&[], &[], vec![]),
            Err(GridError::UnsupportedDimension(0))
        );
    }
}
