use std::{fmt, str::FromStr};

use crate::error::FilterError;

/// Default gaussian truncation, in units of sigma.
pub const DEFAULT_TRUNCATE: f64 = 4.0;

/// Largest kernel radius, in samples, the builders accept.
pub const MAX_KERNEL_RADIUS: usize = 1 << 20;

/// Largest bounding box, in lattice offsets, a non-separable stencil may span.
pub const MAX_STENCIL_OFFSETS: usize = 1 << 24;

/// Relative slack when comparing a top-hat radius against lattice distances, so that
/// e.g. a radius of 0.3 at spacing 0.1 covers three samples.
const RADIUS_TOLERANCE: f64 = 1e-9;

fn check_positive(value: f64, err: fn(f64) -> FilterError) -> Result<f64, FilterError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(err(value))
    }
}

fn check_radius(radius: usize) -> Result<usize, FilterError> {
    if radius > MAX_KERNEL_RADIUS {
        return Err(FilterError::KernelTooLarge {
            radius,
            max: MAX_KERNEL_RADIUS,
        });
    }
    Ok(radius)
}

/// A centered, odd-length, normalized 1-D kernel.
///
/// The weight at index `i` corresponds to the offset `i - radius`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel1d {
    weights: Vec<f64>,
}

impl Kernel1d {
    /// Create a kernel from raw weights, normalizing them to sum to one.
    ///
    /// # Errors
    ///
    /// Fails if the number of weights is even or zero, or if the weights do not have a
    /// finite positive sum.
    pub fn new(mut weights: Vec<f64>) -> Result<Self, FilterError> {
        if weights.len() % 2 == 0 {
            return Err(FilterError::InvalidKernelLength(weights.len()));
        }
        let norm = weights.iter().sum::<f64>();
        if !norm.is_finite() || norm <= 0.0 {
            return Err(FilterError::InvalidWeights(norm));
        }
        weights.iter_mut().for_each(|w| *w /= norm);
        Ok(Self { weights })
    }

    /// The kernel that leaves a signal untouched.
    pub fn identity() -> Self {
        Self { weights: vec![1.0] }
    }

    /// Number of taps on each side of the center.
    #[inline]
    pub fn radius(&self) -> usize {
        self.weights.len() / 2
    }

    /// Total number of taps, `2 * radius + 1`.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false, a kernel holds at least its center tap.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// The weights ordered from offset `-radius` to `+radius`.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// The weight at a signed offset from the center, zero outside the kernel.
    pub fn weight(&self, offset: isize) -> f64 {
        let idx = offset + self.radius() as isize;
        if idx < 0 {
            return 0.0;
        }
        self.weights.get(idx as usize).copied().unwrap_or(0.0)
    }

    /// Iterates over `(offset, weight)` pairs.
    pub fn taps(&self) -> impl Iterator<Item = (isize, f64)> + '_ {
        let radius = self.radius() as isize;
        self.weights
            .iter()
            .enumerate()
            .map(move |(i, &w)| (i as isize - radius, w))
    }

    /// Sum of the weights.
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Returns true if `w[i] == w[-i]` for every offset.
    pub fn is_symmetric(&self) -> bool {
        self.weights
            .iter()
            .zip(self.weights.iter().rev())
            .all(|(a, b)| a == b)
    }

    /// Returns true if every tap carries the same weight.
    pub fn is_uniform(&self) -> bool {
        self.weights.iter().all(|&w| w == self.weights[0])
    }

    /// Returns true if the kernel is the single-tap identity.
    pub fn is_identity(&self) -> bool {
        self.weights.len() == 1
    }
}

/// Create a gaussian kernel sized to the grid spacing.
///
/// The weights are `exp(-(i * spacing)^2 / (2 sigma^2))` for offsets `i` in `[-R, R]`
/// with `R = ceil(truncate * sigma / spacing)`, renormalized to sum to one.
///
/// # Arguments
///
/// * `sigma` - The standard deviation, in physical units.
/// * `spacing` - The distance between adjacent samples.
/// * `truncate` - The kernel extent in units of sigma, see [`DEFAULT_TRUNCATE`].
///
/// # Errors
///
/// Fails on a non-positive sigma, spacing or truncation, and when the truncated kernel
/// would not reach a single neighbour (`truncate * sigma < spacing`).
pub fn gaussian_kernel_1d(sigma: f64, spacing: f64, truncate: f64) -> Result<Kernel1d, FilterError> {
    let sigma = check_positive(sigma, FilterError::InvalidScale)?;
    let spacing = check_positive(spacing, FilterError::InvalidSpacing)?;
    let truncate = check_positive(truncate, FilterError::InvalidTruncate)?;

    let reach = truncate * sigma / spacing;
    if reach < 1.0 {
        return Err(FilterError::DegenerateKernel { reach, spacing });
    }
    let radius = check_radius(reach.ceil() as usize)? as isize;

    let two_sigma_sq = 2.0 * sigma * sigma;
    let weights = (-radius..=radius)
        .map(|i| {
            let x = i as f64 * spacing;
            (-(x * x) / two_sigma_sq).exp()
        })
        .collect();

    Kernel1d::new(weights)
}

/// Number of samples a top-hat of the given radius covers on each side of the center.
pub fn tophat_half_width(radius: f64, spacing: f64) -> usize {
    (radius / spacing * (1.0 + RADIUS_TOLERANCE)).floor() as usize
}

/// Create a flat top-hat kernel sized to the grid spacing.
///
/// The window spans `floor(radius / spacing)` samples on each side of the center, and
/// every tap carries the weight `1 / (2 * floor(radius / spacing) + 1)`.
///
/// # Errors
///
/// Fails on a non-positive radius or spacing, and when the radius is smaller than the
/// spacing so that the window would hold the center sample only.
pub fn tophat_kernel_1d(radius: f64, spacing: f64) -> Result<Kernel1d, FilterError> {
    let radius = check_positive(radius, FilterError::InvalidScale)?;
    let spacing = check_positive(spacing, FilterError::InvalidSpacing)?;

    let half_width = check_radius(tophat_half_width(radius, spacing))?;
    if half_width == 0 {
        return Err(FilterError::DegenerateKernel {
            reach: radius / spacing,
            spacing,
        });
    }

    Kernel1d::new(vec![1.0; 2 * half_width + 1])
}

/// Footprint of the top-hat filter on multi-dimensional grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopHatShape {
    /// Every lattice offset within the physical radius: a disk in 2-D, a ball in 3-D.
    #[default]
    Sphere,

    /// Separable product of 1-D flat windows: a square in 2-D, a cube in 3-D.
    Box,
}

impl TopHatShape {
    /// Name used on the command line and in output metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopHatShape::Sphere => "sphere",
            TopHatShape::Box => "box",
        }
    }
}

impl fmt::Display for TopHatShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopHatShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sphere" | "disk" | "ball" => Ok(TopHatShape::Sphere),
            "box" | "cube" => Ok(TopHatShape::Box),
            other => Err(format!(
                "invalid top-hat shape '{other}', expected 'sphere' or 'box'"
            )),
        }
    }
}

/// A non-separable N-D kernel stored as a list of taps.
#[derive(Debug, Clone, PartialEq)]
pub struct StencilKernel<const N: usize> {
    taps: Vec<([isize; N], f64)>,
    radius: [usize; N],
}

impl<const N: usize> StencilKernel<N> {
    /// Create a stencil from `(offset, weight)` taps, normalizing the weights.
    ///
    /// # Errors
    ///
    /// Fails if there are no taps or the weights do not have a finite positive sum.
    pub fn new(mut taps: Vec<([isize; N], f64)>) -> Result<Self, FilterError> {
        if taps.is_empty() {
            return Err(FilterError::InvalidKernelLength(0));
        }
        let norm = taps.iter().map(|(_, w)| w).sum::<f64>();
        if !norm.is_finite() || norm <= 0.0 {
            return Err(FilterError::InvalidWeights(norm));
        }
        let mut radius = [0; N];
        for (offset, w) in taps.iter_mut() {
            *w /= norm;
            for (r, o) in radius.iter_mut().zip(offset.iter()) {
                *r = (*r).max(o.unsigned_abs());
            }
        }
        Ok(Self { taps, radius })
    }

    /// The `(offset, weight)` taps.
    #[inline]
    pub fn taps(&self) -> &[([isize; N], f64)] {
        &self.taps
    }

    /// Number of taps.
    #[inline]
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Always false, a stencil holds at least one tap.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Largest absolute offset along each axis.
    #[inline]
    pub fn radius(&self) -> [usize; N] {
        self.radius
    }

    /// Sum of the weights.
    pub fn sum(&self) -> f64 {
        self.taps.iter().map(|(_, w)| w).sum()
    }

    /// The weight at `offset`, zero if the offset is not a tap.
    pub fn weight(&self, offset: [isize; N]) -> f64 {
        self.taps
            .iter()
            .find(|(o, _)| *o == offset)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }
}

/// Create an isotropic top-hat stencil: every lattice offset whose physical distance
/// from the origin is within `radius`, all with equal weight.
///
/// # Errors
///
/// Fails on a non-positive radius or spacing, when the radius is smaller than the
/// spacing along any axis, and when the bounding box of the stencil exceeds
/// [`MAX_STENCIL_OFFSETS`].
pub fn tophat_stencil<const N: usize>(
    radius: f64,
    spacing: [f64; N],
) -> Result<StencilKernel<N>, FilterError> {
    let radius = check_positive(radius, FilterError::InvalidScale)?;

    let mut half_widths = [0usize; N];
    for (h, &dx) in half_widths.iter_mut().zip(spacing.iter()) {
        let dx = check_positive(dx, FilterError::InvalidSpacing)?;
        *h = check_radius(tophat_half_width(radius, dx))?;
        if *h == 0 {
            return Err(FilterError::DegenerateKernel {
                reach: radius / dx,
                spacing: dx,
            });
        }
    }

    let box_len = half_widths
        .iter()
        .try_fold(1usize, |acc, h| acc.checked_mul(2 * h + 1))
        .filter(|&len| len <= MAX_STENCIL_OFFSETS)
        .ok_or(FilterError::StencilTooLarge {
            half_widths: half_widths.to_vec(),
            max: MAX_STENCIL_OFFSETS,
        })?;
    let limit = radius * radius * (1.0 + RADIUS_TOLERANCE).powi(2);

    let mut taps = Vec::new();
    for flat in 0..box_len {
        let mut offset = [0isize; N];
        let mut rem = flat;
        for axis in (0..N).rev() {
            let side = 2 * half_widths[axis] + 1;
            offset[axis] = (rem % side) as isize - half_widths[axis] as isize;
            rem /= side;
        }
        let dist_sq = offset
            .iter()
            .zip(spacing.iter())
            .map(|(&o, &dx)| {
                let x = o as f64 * dx;
                x * x
            })
            .sum::<f64>();
        if dist_sq <= limit {
            taps.push((offset, 1.0));
        }
    }

    StencilKernel::new(taps)
}
