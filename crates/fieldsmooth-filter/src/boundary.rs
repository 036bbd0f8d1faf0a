use std::{fmt, str::FromStr};

/// How a kernel is evaluated where its footprint extends past the grid edge.
///
/// Exactly one policy is active for a filtering run and it applies uniformly to every
/// axis and every kernel tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Out-of-range indices wrap around modulo the extent, the domain is a torus.
    ///
    /// Example: ...x y z | a b c d | a b c...
    #[default]
    Periodic,

    /// Out-of-range taps are dropped and the remaining weights are rescaled to sum to one.
    TruncateRenormalize,
}

impl BoundaryPolicy {
    #[inline]
    fn wrap(i: isize, len: usize) -> usize {
        i.rem_euclid(len as isize) as usize
    }

    /// Maps index `i` to a valid index within `[0, len)` according to the policy.
    ///
    /// - `Periodic`: circular wrap, kernels wider than the extent wrap several times.
    /// - `TruncateRenormalize`: `None` when `i` falls outside the grid, the tap is dropped.
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        match self {
            BoundaryPolicy::Periodic => Some(Self::wrap(i, len)),
            BoundaryPolicy::TruncateRenormalize => {
                (i >= 0 && i < len as isize).then_some(i as usize)
            }
        }
    }

    /// Name used on the command line and in output metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryPolicy::Periodic => "periodic",
            BoundaryPolicy::TruncateRenormalize => "truncate",
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "periodic" | "wrap" => Ok(BoundaryPolicy::Periodic),
            "truncate" | "truncate-renormalize" | "renormalize" => {
                Ok(BoundaryPolicy::TruncateRenormalize)
            }
            other => Err(format!(
                "invalid boundary policy '{other}', expected 'periodic' or 'truncate'"
            )),
        }
    }
}
