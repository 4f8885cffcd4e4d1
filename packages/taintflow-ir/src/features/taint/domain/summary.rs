//! Per-function fact summaries
//!
//! The termination mechanism: facts merge per function, never per call
//! string. Revisiting a function with an already-seen location is a no-op,
//! which bounds the lattice at (locations per function) x (seeds) and makes
//! recursion converge instead of unrolling.

use ahash::AHashMap;
use rustc_hash::FxHashSet;

use super::fact::{AbstractLoc, TaintFact};
use crate::features::linker::domain::FunctionId;

/// Locations already tainted in one function during one propagation
#[derive(Debug, Default)]
struct FunctionFacts {
    seen: FxHashSet<AbstractLoc>,
}

/// The merged per-function fact sets of one propagation
#[derive(Debug, Default)]
pub struct SummaryTable {
    per_function: AHashMap<FunctionId, FunctionFacts>,
}

impl SummaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fact; returns false when it was already known, making the
    /// revisit a no-op for the caller
    pub fn insert(&mut self, fact: &TaintFact) -> bool {
        self.per_function
            .entry(fact.function)
            .or_default()
            .seen
            .insert(fact.loc.clone())
    }

    pub fn contains(&self, fact: &TaintFact) -> bool {
        self.per_function
            .get(&fact.function)
            .map(|f| f.seen.contains(&fact.loc))
            .unwrap_or(false)
    }

    /// Distinct tainted locations recorded in `function`
    pub fn facts_in(&self, function: FunctionId) -> usize {
        self.per_function
            .get(&function)
            .map(|f| f.seen.len())
            .unwrap_or(0)
    }

    /// Distinct tainted locations across all functions
    pub fn total(&self) -> usize {
        self.per_function.values().map(|f| f.seen.len()).sum()
    }
}
