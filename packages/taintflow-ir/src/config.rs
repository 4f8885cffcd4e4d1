//! Analysis configuration
//!
//! Options load from YAML or JSON so drivers can keep analysis policy in
//! config files, or construct them directly for embedded use.

use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    DEFAULT_DEF_USE_CACHE_CAPACITY, DEFAULT_MAX_FACTS_PER_SEED, DEFAULT_MAX_WORKLIST_ITERATIONS,
};

/// Direction of the taint query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// From source results toward sink operands, along def-use edges
    Forward,
    /// From sink operands toward source results, along use-def edges
    Backward,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Forward
    }
}

/// Knobs for one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub direction: Direction,

    /// Facts processed per seed before the seed is marked incomplete.
    /// The escape hatch for pathological graphs; exceeding it never fails
    /// the run.
    pub max_facts_per_seed: usize,

    /// Worklist pops per seed, the second safety net
    pub max_worklist_iterations: usize,

    /// Run one propagation per seed on the worker pool; seeds are
    /// independent until aggregation
    pub shard_seeds: bool,

    /// Capacity of the shared def-use index cache
    pub def_use_cache_capacity: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            max_facts_per_seed: DEFAULT_MAX_FACTS_PER_SEED,
            max_worklist_iterations: DEFAULT_MAX_WORKLIST_ITERATIONS,
            shard_seeds: true,
            def_use_cache_capacity: DEFAULT_DEF_USE_CACHE_CAPACITY,
        }
    }
}

impl AnalysisOptions {
    pub fn forward() -> Self {
        Self::default()
    }

    pub fn backward() -> Self {
        Self {
            direction: Direction::Backward,
            ..Self::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_max_facts_per_seed(mut self, max: usize) -> Self {
        self.max_facts_per_seed = max;
        self
    }

    pub fn from_yaml(text: &str) -> Result<Self, crate::errors::TaintflowError> {
        serde_yaml::from_str(text).map_err(|e| crate::errors::TaintflowError::Config(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, crate::errors::TaintflowError> {
        serde_json::from_str(text).map_err(|e| crate::errors::TaintflowError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AnalysisOptions::default();
        assert_eq!(options.direction, Direction::Forward);
        assert!(options.shard_seeds);
        assert_eq!(options.max_facts_per_seed, DEFAULT_MAX_FACTS_PER_SEED);
    }

    #[test]
    fn test_from_yaml_overrides_partially() {
        let options =
            AnalysisOptions::from_yaml("direction: backward\nmax_facts_per_seed: 10\n").unwrap();
        assert_eq!(options.direction, Direction::Backward);
        assert_eq!(options.max_facts_per_seed, 10);
        // Unspecified fields keep their defaults
        assert_eq!(
            options.max_worklist_iterations,
            DEFAULT_MAX_WORKLIST_ITERATIONS
        );
    }

    #[test]
    fn test_from_json() {
        let options = AnalysisOptions::from_json(r#"{"direction":"forward"}"#).unwrap();
        assert_eq!(options.direction, Direction::Forward);
    }
}
