//! Running an analysis
//!
//! One run is a state machine: NotStarted -> Running -> Completed | Failed.
//! Failed is reserved for internal invariant violations; budget exhaustion
//! and unresolved callees complete the run with markers in the results.
//!
//! Seeds are independent propagations until their outcomes meet, so they
//! shard across the worker pool and merge under a single aggregation lock.

use parking_lot::Mutex;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{AnalysisOptions, Direction};
use crate::features::call_graph::domain::{CallGraph, CallSiteRef};
use crate::features::linker::domain::ModuleGroup;
use crate::features::taint::domain::{Finding, Specification, TaintAnalysisResults};
use crate::features::taint::error::AnalysisError;
use crate::features::taint::infrastructure::{
    backward_seeds, forward_seeds, propagate_backward, propagate_forward, validate_graph,
    DefUseCache, EngineContext, PropagationOutcome, RunState, Seed,
};

/// One analysis run over a linked group and its call graph
pub struct TaintAnalysis<'a> {
    group: &'a ModuleGroup,
    graph: &'a CallGraph,
    spec: &'a Specification,
    options: AnalysisOptions,
    state: RunState,
}

#[derive(Default)]
struct Aggregate {
    findings: Vec<Finding>,
    incomplete_seeds: Vec<CallSiteRef>,
    facts_processed: usize,
}

impl<'a> TaintAnalysis<'a> {
    pub fn new(
        group: &'a ModuleGroup,
        graph: &'a CallGraph,
        spec: &'a Specification,
        options: AnalysisOptions,
    ) -> Self {
        Self {
            group,
            graph,
            spec,
            options,
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run(&mut self) -> Result<TaintAnalysisResults, AnalysisError> {
        self.state = RunState::Running;
        match self.execute() {
            Ok(results) => {
                self.state = RunState::Completed;
                Ok(results)
            }
            Err(error) => {
                self.state = RunState::Failed;
                Err(error)
            }
        }
    }

    fn execute(&self) -> Result<TaintAnalysisResults, AnalysisError> {
        validate_graph(self.group, self.graph)?;

        let def_use = DefUseCache::new(self.options.def_use_cache_capacity);
        let cx = EngineContext {
            group: self.group,
            graph: self.graph,
            spec: self.spec,
            options: &self.options,
            def_use: &def_use,
        };

        let seeds = match self.options.direction {
            Direction::Forward => forward_seeds(&cx)?,
            Direction::Backward => backward_seeds(&cx)?,
        };
        info!(
            specification = %self.spec.name,
            direction = ?self.options.direction,
            seeds = seeds.len(),
            "taint analysis started"
        );

        let run_seed = |seed: &Seed| -> PropagationOutcome {
            match self.options.direction {
                Direction::Forward => propagate_forward(&cx, seed),
                Direction::Backward => propagate_backward(&cx, seed),
            }
        };

        let aggregate = Mutex::new(Aggregate::default());
        let merge = |seed: &Seed, outcome: PropagationOutcome| {
            let mut agg = aggregate.lock();
            agg.findings.extend(outcome.findings);
            if outcome.incomplete {
                agg.incomplete_seeds.push(seed.site);
            }
            agg.facts_processed += outcome.facts_processed;
        };

        #[cfg(feature = "parallel")]
        if self.options.shard_seeds {
            seeds.par_iter().for_each(|seed| merge(seed, run_seed(seed)));
        } else {
            seeds.iter().for_each(|seed| merge(seed, run_seed(seed)));
        }

        #[cfg(not(feature = "parallel"))]
        seeds.iter().for_each(|seed| merge(seed, run_seed(seed)));

        let mut aggregate = aggregate.into_inner();
        aggregate
            .findings
            .sort_by(|a, b| (a.source, a.sink).cmp(&(b.source, b.sink)));
        aggregate.findings.dedup();
        aggregate.incomplete_seeds.sort();

        if !aggregate.incomplete_seeds.is_empty() {
            warn!(
                incomplete = aggregate.incomplete_seeds.len(),
                "some seeds exceeded the fact budget; results are incomplete"
            );
        }
        info!(
            findings = aggregate.findings.len(),
            facts = aggregate.facts_processed,
            "taint analysis completed"
        );

        Ok(TaintAnalysisResults {
            specification: self.spec.name.clone(),
            direction: self.options.direction,
            findings: aggregate.findings,
            seeds: seeds.len(),
            incomplete_seeds: aggregate.incomplete_seeds,
            unresolved_call_count: self.graph.unresolved_site_count(),
            facts_processed: aggregate.facts_processed,
        })
    }
}

/// Analyze with default options in the given direction
pub fn analyze(
    group: &ModuleGroup,
    graph: &CallGraph,
    spec: &Specification,
    direction: Direction,
) -> Result<TaintAnalysisResults, AnalysisError> {
    analyze_with_options(
        group,
        graph,
        spec,
        AnalysisOptions::default().with_direction(direction),
    )
}

/// Analyze with explicit options
pub fn analyze_with_options(
    group: &ModuleGroup,
    graph: &CallGraph,
    spec: &Specification,
    options: AnalysisOptions,
) -> Result<TaintAnalysisResults, AnalysisError> {
    TaintAnalysis::new(group, graph, spec, options).run()
}
