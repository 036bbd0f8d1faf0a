use std::time::Instant;

use fieldsmooth_grid::{Grid, Sample};
use rayon::prelude::*;

use super::kernels::Kernel1d;
use crate::{boundary::BoundaryPolicy, error::FilterError, parallel::ExecutionStrategy};

/// Convolve a line of samples with a 1-D kernel by direct accumulation.
///
/// Costs O(n * k) for a line of `n` samples and a kernel of `k` taps.
///
/// PRECONDITION: `src` and `dst` have the same, non-zero length.
pub fn convolve_line_direct(
    src: &[f64],
    dst: &mut [f64],
    kernel: &Kernel1d,
    policy: BoundaryPolicy,
) {
    let len = src.len();
    for (i, out) in dst.iter_mut().enumerate() {
        let mut acc = 0.0;
        let mut norm = 0.0;
        for (off, w) in kernel.taps() {
            if let Some(j) = policy.map_index(i as isize + off, len) {
                acc += w * src[j];
                norm += w;
            }
        }
        *out = match policy {
            BoundaryPolicy::Periodic => acc,
            BoundaryPolicy::TruncateRenormalize => acc / norm,
        };
    }
}

/// Neumaier compensated accumulator.
///
/// The rounding error of every update is carried separately, so a large sample that
/// enters and later leaves a running window leaves no residue behind.
#[derive(Debug, Default, Clone, Copy)]
struct CompensatedSum {
    sum: f64,
    carry: f64,
}

impl CompensatedSum {
    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.carry += (self.sum - t) + x;
        } else {
            self.carry += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn value(&self) -> f64 {
        self.sum + self.carry
    }
}

/// Convolve a line of samples with a flat window using a running sum.
///
/// Costs O(n + k) regardless of the window width. Under the truncate policy the
/// renormalized flat window is the plain mean of the in-range samples. The window sum
/// is compensated, so it agrees with [`convolve_line_direct`] even when the line mixes
/// very different magnitudes.
///
/// PRECONDITION: `src` and `dst` have the same, non-zero length.
pub fn convolve_line_running_sum(
    src: &[f64],
    dst: &mut [f64],
    half_width: usize,
    policy: BoundaryPolicy,
) {
    let len = src.len();
    let h = half_width as isize;
    let mut acc = CompensatedSum::default();

    match policy {
        BoundaryPolicy::Periodic => {
            let wrap = |i: isize| i.rem_euclid(len as isize) as usize;
            let weight = 1.0 / (2 * half_width + 1) as f64;

            // the window may be wider than the line, in which case it wraps several times
            (-h..=h).for_each(|k| acc.add(src[wrap(k)]));
            dst[0] = acc.value() * weight;
            for i in 1..len as isize {
                acc.add(src[wrap(i + h)]);
                acc.add(-src[wrap(i - 1 - h)]);
                dst[i as usize] = acc.value() * weight;
            }
        }
        BoundaryPolicy::TruncateRenormalize => {
            let last = len - 1;
            src[..=half_width.min(last)]
                .iter()
                .for_each(|&v| acc.add(v));
            for (i, out) in dst.iter_mut().enumerate() {
                if i > 0 {
                    if i + half_width <= last {
                        acc.add(src[i + half_width]);
                    }
                    if i > half_width {
                        acc.add(-src[i - half_width - 1]);
                    }
                }
                let lo = i.saturating_sub(half_width);
                let hi = (i + half_width).min(last);
                *out = acc.value() / (hi - lo + 1) as f64;
            }
        }
    }
}

/// Convolve a line of samples with a 1-D kernel.
///
/// Flat windows go through [`convolve_line_running_sum`], every other kernel through
/// [`convolve_line_direct`]. Both agree within floating point tolerance.
///
/// PRECONDITION: `src` and `dst` have the same, non-zero length.
pub fn convolve_line(src: &[f64], dst: &mut [f64], kernel: &Kernel1d, policy: BoundaryPolicy) {
    if kernel.is_identity() {
        dst.copy_from_slice(src);
    } else if kernel.is_uniform() {
        convolve_line_running_sum(src, dst, kernel.radius(), policy);
    } else {
        convolve_line_direct(src, dst, kernel, policy);
    }
}

/// Apply a 1-D kernel along `axis` of a row-major buffer.
///
/// The output buffer is split into disjoint chunks, one per line along the last axis or
/// one per row of `inner` samples along any other axis, so that each worker writes
/// only its own chunk.
fn filter_axis<const N: usize>(
    src: &[f64],
    dst: &mut [f64],
    shape: [usize; N],
    axis: usize,
    kernel: &Kernel1d,
    policy: BoundaryPolicy,
    parallel: bool,
) {
    let len = shape[axis];
    let inner = shape[axis + 1..].iter().product::<usize>();

    if inner == 1 {
        // lines along the contiguous axis
        let process = |(line, dst_line): (usize, &mut [f64])| {
            let src_line = &src[line * len..(line + 1) * len];
            convolve_line(src_line, dst_line, kernel, policy);
        };
        if parallel {
            dst.par_chunks_mut(len).enumerate().for_each(process);
        } else {
            dst.chunks_mut(len).enumerate().for_each(process);
        }
        return;
    }

    // each output row is a weighted sum of whole source rows
    let process = |(row, dst_row): (usize, &mut [f64])| {
        let outer = row / len;
        let i = row % len;
        let base = outer * len * inner;

        dst_row.fill(0.0);
        let mut norm = 0.0;
        for (off, w) in kernel.taps() {
            let Some(j) = policy.map_index(i as isize + off, len) else {
                continue;
            };
            norm += w;
            let src_row = &src[base + j * inner..base + (j + 1) * inner];
            dst_row
                .iter_mut()
                .zip(src_row.iter())
                .for_each(|(d, &s)| *d += w * s);
        }

        if policy == BoundaryPolicy::TruncateRenormalize {
            dst_row.iter_mut().for_each(|d| *d /= norm);
        }
    };
    if parallel {
        dst.par_chunks_mut(inner).enumerate().for_each(process);
    } else {
        dst.chunks_mut(inner).enumerate().for_each(process);
    }
}

/// Apply a separable filter, one 1-D pass per axis, with execution strategy control.
///
/// Samples are widened to `f64` for the whole computation and narrowed once at the end.
/// The input grid is not modified; the output has the same shape and spacing.
///
/// # Arguments
///
/// * `src` - The source grid.
/// * `kernels` - One kernel per axis, in axis order.
/// * `policy` - The boundary policy applied along every axis.
/// * `strategy` - Execution strategy: `Serial`, `Parallel`, `Auto` or `Fixed`.
pub fn separable_filter_with_strategy<T: Sample, const N: usize>(
    src: &Grid<T, N>,
    kernels: &[Kernel1d; N],
    policy: BoundaryPolicy,
    strategy: ExecutionStrategy,
) -> Result<Grid<T, N>, FilterError> {
    let shape = src.shape();
    let parallel = strategy.is_parallel(src.numel());

    let data = strategy.install(|| {
        let mut current = src.iter().map(|v| v.to_f64()).collect::<Vec<_>>();
        let mut next = vec![0.0; current.len()];

        for (axis, kernel) in kernels.iter().enumerate() {
            if kernel.is_identity() {
                continue;
            }
            let start = Instant::now();
            filter_axis(&current, &mut next, shape, axis, kernel, policy, parallel);
            std::mem::swap(&mut current, &mut next);
            log::debug!(
                "axis {} pass: {} taps over {} samples in {:?}",
                axis,
                kernel.len(),
                shape[axis],
                start.elapsed()
            );
        }

        current.into_iter().map(T::from_f64).collect::<Vec<_>>()
    })?;

    Ok(src.with_data(data)?)
}

/// Apply a separable filter to a grid.
///
/// Uses `ExecutionStrategy::Auto`. For explicit control, use
/// [`separable_filter_with_strategy`].
pub fn separable_filter<T: Sample, const N: usize>(
    src: &Grid<T, N>,
    kernels: &[Kernel1d; N],
    policy: BoundaryPolicy,
) -> Result<Grid<T, N>, FilterError> {
    separable_filter_with_strategy(src, kernels, policy, ExecutionStrategy::Auto)
}
