use num_traits::Zero;

/// Floating point sample types a grid can hold.
///
/// Filters accumulate in `f64` whatever the storage type is, so every sample type
/// converts losslessly into `f64` and back with rounding.
pub trait Sample: Copy + Zero + PartialOrd + Send + Sync + std::fmt::Debug + 'static {
    /// Short name of the type, as written in grid files.
    const NAME: &'static str;

    /// Widen the sample to `f64`.
    fn to_f64(self) -> f64;

    /// Narrow an `f64` to the sample type.
    fn from_f64(val: f64) -> Self;
}

impl Sample for f32 {
    const NAME: &'static str = "f32";

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(val: f64) -> Self {
        val as f32
    }
}

impl Sample for f64 {
    const NAME: &'static str = "f64";

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(val: f64) -> Self {
        val
    }
}
