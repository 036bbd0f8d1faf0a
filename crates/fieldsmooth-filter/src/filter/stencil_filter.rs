use std::time::Instant;

use fieldsmooth_grid::{Grid, Sample};
use rayon::prelude::*;

use super::kernels::StencilKernel;
use crate::{boundary::BoundaryPolicy, error::FilterError, parallel::ExecutionStrategy};

/// Apply a non-separable N-D kernel by direct convolution, with execution strategy control.
///
/// Each output line along the last axis is an independent chunk: for every tap the
/// leading coordinates are mapped once through the boundary policy and the tap is then
/// swept along the line.
///
/// # Arguments
///
/// * `src` - The source grid.
/// * `kernel` - The stencil to apply.
/// * `policy` - The boundary policy applied along every axis.
/// * `strategy` - Execution strategy: `Serial`, `Parallel`, `Auto` or `Fixed`.
pub fn stencil_filter_with_strategy<T: Sample, const N: usize>(
    src: &Grid<T, N>,
    kernel: &StencilKernel<N>,
    policy: BoundaryPolicy,
    strategy: ExecutionStrategy,
) -> Result<Grid<T, N>, FilterError> {
    let shape = src.shape();
    let strides = src.strides();
    let line = shape[N - 1];
    let parallel = strategy.is_parallel(src.numel());

    let data = strategy.install(|| {
        let start = Instant::now();
        let values = src.iter().map(|v| v.to_f64()).collect::<Vec<_>>();
        let mut out = vec![0.0; values.len()];

        let process = |(row, dst_line): (usize, &mut [f64])| {
            let mut index = [0usize; N];
            let mut rem = row;
            for axis in (0..N - 1).rev() {
                index[axis] = rem % shape[axis];
                rem /= shape[axis];
            }

            let mut norm = vec![0.0; line];
            'taps: for (offset, w) in kernel.taps() {
                let mut base = 0;
                for axis in 0..N - 1 {
                    match policy.map_index(index[axis] as isize + offset[axis], shape[axis]) {
                        Some(j) => base += j * strides[axis],
                        None => continue 'taps,
                    }
                }
                let last_off = offset[N - 1];
                for (c, (d, n)) in dst_line.iter_mut().zip(norm.iter_mut()).enumerate() {
                    if let Some(j) = policy.map_index(c as isize + last_off, line) {
                        *d += w * values[base + j];
                        *n += w;
                    }
                }
            }

            if policy == BoundaryPolicy::TruncateRenormalize {
                dst_line
                    .iter_mut()
                    .zip(norm.iter())
                    .for_each(|(d, &n)| *d /= n);
            }
        };

        if parallel {
            out.par_chunks_mut(line).enumerate().for_each(process);
        } else {
            out.chunks_mut(line).enumerate().for_each(process);
        }

        log::debug!(
            "stencil pass: {} taps over {:?} samples in {:?}",
            kernel.len(),
            shape,
            start.elapsed()
        );

        out.into_iter().map(T::from_f64).collect::<Vec<_>>()
    })?;

    Ok(src.with_data(data)?)
}

/// Apply a non-separable N-D kernel to a grid.
///
/// Uses `ExecutionStrategy::Auto`. For explicit control, use
/// [`stencil_filter_with_strategy`].
pub fn stencil_filter<T: Sample, const N: usize>(
    src: &Grid<T, N>,
    kernel: &StencilKernel<N>,
    policy: BoundaryPolicy,
) -> Result<Grid<T, N>, FilterError> {
    stencil_filter_with_strategy(src, kernel, policy, ExecutionStrategy::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{
        kernels::{tophat_kernel_1d, tophat_stencil},
        separable_filter::separable_filter_with_strategy,
    };
    use approx::assert_relative_eq;

    fn box_stencil<const N: usize>(half_width: isize) -> Result<StencilKernel<N>, FilterError> {
        let side = (2 * half_width + 1) as usize;
        let taps = (0..side.pow(N as u32))
            .map(|flat| {
                let mut offset = [0isize; N];
                let mut rem = flat;
                for o in offset.iter_mut().rev() {
                    *o = (rem % side) as isize - half_width;
                    rem /= side;
                }
                (offset, 1.0)
            })
            .collect();
        StencilKernel::new(taps)
    }

    #[test]
    fn test_stencil_disk_impulse() -> Result<(), FilterError> {
        let grid = Grid::<f64, 2>::from_shape_fn([7, 7], [1.0, 1.0], |[i, j]| {
            if i == 3 && j == 3 {
                1.0
            } else {
                0.0
            }
        })?;
        let stencil = tophat_stencil(2.0, [1.0, 1.0])?;
        let dst = stencil_filter(&grid, &stencil, BoundaryPolicy::Periodic)?;

        for i in 0..7 {
            for j in 0..7 {
                let (di, dj) = (i as f64 - 3.0, j as f64 - 3.0);
                let value = dst.get([i, j]).copied().unwrap_or(f64::NAN);
                if di * di + dj * dj <= 4.0 {
                    assert_eq!(value, 1.0 / 13.0);
                } else {
                    assert_eq!(value, 0.0);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_stencil_periodic_wrap() -> Result<(), FilterError> {
        let grid = Grid::<f64, 2>::from_shape_fn([4, 4], [1.0, 1.0], |[i, j]| {
            if i == 0 && j == 0 {
                5.0
            } else {
                0.0
            }
        })?;
        let stencil = tophat_stencil(1.0, [1.0, 1.0])?;
        let dst = stencil_filter(&grid, &stencil, BoundaryPolicy::Periodic)?;
        assert_eq!(dst.get([0, 0]), Some(&1.0));
        assert_eq!(dst.get([3, 0]), Some(&1.0));
        assert_eq!(dst.get([0, 3]), Some(&1.0));
        assert_eq!(dst.get([1, 0]), Some(&1.0));
        assert_eq!(dst.get([3, 3]), Some(&0.0));
        assert_relative_eq!(dst.sum(), 5.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_stencil_matches_separable_box() -> Result<(), FilterError> {
        let grid = Grid::<f64, 3>::from_shape_fn([5, 6, 7], [1.0; 3], |[i, j, k]| {
            ((i * 7 + j * 3 + k) % 5) as f64 - 2.0
        })?;
        let stencil = box_stencil::<3>(1)?;
        let kernel = tophat_kernel_1d(1.0, 1.0)?;
        let kernels = [kernel.clone(), kernel.clone(), kernel];

        for policy in [BoundaryPolicy::Periodic, BoundaryPolicy::TruncateRenormalize] {
            let direct =
                stencil_filter_with_strategy(&grid, &stencil, policy, ExecutionStrategy::Serial)?;
            let separable =
                separable_filter_with_strategy(&grid, &kernels, policy, ExecutionStrategy::Serial)?;
            for (a, b) in direct.iter().zip(separable.iter()) {
                assert_relative_eq!(a, b, epsilon = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn test_stencil_truncate_keeps_constants() -> Result<(), FilterError> {
        let grid = Grid::<f32, 2>::from_shape_val([6, 5], [1.0, 1.0], 2.5)?;
        let stencil = tophat_stencil(2.0, [1.0, 1.0])?;
        let dst = stencil_filter(&grid, &stencil, BoundaryPolicy::TruncateRenormalize)?;
        for &v in dst.iter() {
            assert_relative_eq!(v, 2.5, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_stencil_serial_parallel_identical() -> Result<(), FilterError> {
        let grid = Grid::<f64, 3>::from_shape_fn([8, 9, 10], [1.0; 3], |[i, j, k]| {
            ((i * 31 + j * 17 + k * 7) % 11) as f64
        })?;
        let stencil = tophat_stencil(2.0, [1.0; 3])?;
        let serial = stencil_filter_with_strategy(
            &grid,
            &stencil,
            BoundaryPolicy::Periodic,
            ExecutionStrategy::Serial,
        )?;
        let parallel = stencil_filter_with_strategy(
            &grid,
            &stencil,
            BoundaryPolicy::Periodic,
            ExecutionStrategy::Parallel,
        )?;
        assert_eq!(serial, parallel);
        Ok(())
    }
}
