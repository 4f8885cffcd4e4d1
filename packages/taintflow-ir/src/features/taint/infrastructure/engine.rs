//! Engine context, run states, and seed discovery

use serde::{Deserialize, Serialize};

use super::def_use_cache::DefUseCache;
use crate::config::AnalysisOptions;
use crate::features::call_graph::domain::{CallGraph, CallSiteRef, CallTarget};
use crate::features::ir::domain::{CanonicalFunction, CanonicalOperator, ValueId};
use crate::features::linker::domain::{FunctionId, ModuleGroup};
use crate::features::taint::domain::{CallSiteClass, Specification};
use crate::features::taint::error::AnalysisError;

/// Lifecycle of one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
    Failed,
}

/// Read-only state every propagation shares
pub struct EngineContext<'a> {
    pub group: &'a ModuleGroup,
    pub graph: &'a CallGraph,
    pub spec: &'a Specification,
    pub options: &'a AnalysisOptions,
    pub def_use: &'a DefUseCache,
}

impl<'a> EngineContext<'a> {
    pub fn body(&self, id: FunctionId) -> Option<&'a CanonicalFunction> {
        self.group.get(id).map(|f| &f.body)
    }

    /// Qualified symbol a call target answers to; the unknown node has none
    pub fn target_symbol<'t>(&'t self, target: &'t CallTarget) -> Option<&'t str> {
        match target {
            CallTarget::Resolved(id) => self.group.get(*id).map(|f| f.symbol()),
            CallTarget::External(symbol) => Some(symbol),
            CallTarget::Unknown => None,
        }
    }

    /// Classify a call target against the specification. An unresolved
    /// symbol still matches by its raw qualified name; the unknown node
    /// never matches anything.
    pub fn classify(&self, target: &CallTarget) -> CallSiteClass {
        match self.target_symbol(target) {
            Some(symbol) => self.spec.classify(symbol),
            None => CallSiteClass::Plain,
        }
    }
}

/// The graph must only reference functions the group owns; anything else is
/// a broken invariant, not an analyzable input
pub fn validate_graph(group: &ModuleGroup, graph: &CallGraph) -> Result<(), AnalysisError> {
    for id in graph.function_ids() {
        if group.get(id).is_none() {
            return Err(AnalysisError::UnknownFunction(id));
        }
    }
    Ok(())
}

/// One propagation's starting point
#[derive(Debug, Clone)]
pub struct Seed {
    /// The matched source call site (forward) or sink call site (backward)
    pub site: CallSiteRef,
    /// Specification symbol the site matched
    pub symbol: String,
    /// Values initially tainted: the call result (forward) or the call
    /// arguments (backward)
    pub values: Vec<ValueId>,
}

/// Source call sites, each seeding its result value
pub fn forward_seeds(cx: &EngineContext<'_>) -> Result<Vec<Seed>, AnalysisError> {
    collect_seeds(cx, CallSiteClass::Source, |inst| {
        inst.result().map(|d| vec![d.value]).unwrap_or_default()
    })
}

/// Sink call sites, each seeding its argument values
pub fn backward_seeds(cx: &EngineContext<'_>) -> Result<Vec<Seed>, AnalysisError> {
    collect_seeds(cx, CallSiteClass::Sink, |inst| match inst {
        CanonicalOperator::CallDirect { args, .. } | CanonicalOperator::CallIndirect { args, .. } => {
            args.clone()
        }
        _ => Vec::new(),
    })
}

fn collect_seeds(
    cx: &EngineContext<'_>,
    wanted: CallSiteClass,
    values_of: impl Fn(&CanonicalOperator) -> Vec<ValueId>,
) -> Result<Vec<Seed>, AnalysisError> {
    let mut seeds = Vec::new();
    for site in cx.graph.call_sites() {
        for target in cx.graph.targets_at(&site) {
            if cx.classify(target) != wanted {
                continue;
            }
            let symbol = cx
                .target_symbol(target)
                .map(|s| s.to_string())
                .unwrap_or_default();
            let inst = cx
                .body(site.function)
                .and_then(|b| b.instruction_at(site.block, site.index))
                .ok_or(AnalysisError::MalformedCallSite { site })?;
            if !inst.op.is_call() {
                return Err(AnalysisError::MalformedCallSite { site });
            }
            let values = values_of(&inst.op);
            if !values.is_empty() {
                seeds.push(Seed {
                    site,
                    symbol,
                    values,
                });
            }
        }
    }
    Ok(seeds)
}
