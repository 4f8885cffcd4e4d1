//! Default budgets and limits
//!
//! The analysis engine never fails on a pathological input; it stops the
//! offending seed's propagation once one of these budgets is exhausted and
//! marks the seed incomplete in the results.

/// Max taint facts processed per seed before the seed is marked incomplete
pub const DEFAULT_MAX_FACTS_PER_SEED: usize = 100_000;

/// Max worklist pops per seed (second safety net; facts can be re-enqueued)
pub const DEFAULT_MAX_WORKLIST_ITERATIONS: usize = 1_000_000;

/// Capacity of the shared per-function def-use index cache
pub const DEFAULT_DEF_USE_CACHE_CAPACITY: usize = 1_024;
