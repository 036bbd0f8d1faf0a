use crate::error::FilterError;

/// Number of samples from which [`ExecutionStrategy::Auto`] switches to parallel execution.
pub const PARALLEL_THRESHOLD: usize = 100_000;

/// Controls how the convolution passes are executed.
///
/// In parallel execution every pass splits the output buffer into disjoint chunks and
/// each worker writes only its own chunk while reading the shared, immutable input.
/// Serial and parallel execution therefore give bit-identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    Serial,

    /// Use the global Rayon thread pool.
    Parallel,

    /// Parallel for grids of at least [`PARALLEL_THRESHOLD`] samples, serial otherwise.
    #[default]
    Auto,

    /// Run on a local thread pool with `n` threads.
    ///
    /// The pool is created on every call.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Returns true if a grid of `numel` samples is processed in parallel.
    pub fn is_parallel(&self, numel: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::Parallel | ExecutionStrategy::Fixed(_) => true,
            ExecutionStrategy::Auto => numel >= PARALLEL_THRESHOLD,
        }
    }

    /// Runs `op` inside the thread pool selected by the strategy.
    pub(crate) fn install<R, F>(&self, op: F) -> Result<R, FilterError>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match *self {
            ExecutionStrategy::Fixed(0) => Err(FilterError::InvalidThreadCount(0)),
            ExecutionStrategy::Fixed(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|e| FilterError::ThreadPool(e.to_string()))?;
                Ok(pool.install(op))
            }
            _ => Ok(op()),
        }
    }
}
