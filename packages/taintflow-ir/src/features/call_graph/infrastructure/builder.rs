//! Call graph construction
//!
//! Extraction is a pure read of each function body plus the group's symbol
//! table, so functions are processed in parallel; the graph itself is
//! assembled by a single writer afterwards.
//!
//! Indirect resolution, in order of preference:
//! 1. Chase the callee operand back through assignment chains; a visible
//!    function reference resolves exactly like a direct call.
//! 2. Otherwise, every model stub whose parameter count matches the call's
//!    argument count is a candidate.
//! 3. No candidates at all: a single synthetic edge to the modeled-unknown
//!    node, which the engines treat as taint-preserving.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::info;

use crate::features::call_graph::domain::{CallGraph, CallSiteRef, CallTarget};
use crate::features::ir::domain::{
    BlockId, CanonicalFunction, CanonicalOperator, DefSite, DefUseIndex, ValueId,
};
use crate::features::linker::domain::{FunctionId, ModuleGroup};

/// Build the call graph for a linked module group. Never fails; the result
/// may over-approximate.
pub fn build_call_graph(group: &ModuleGroup) -> CallGraph {
    let ids: Vec<FunctionId> = group.function_ids().collect();

    #[cfg(feature = "parallel")]
    let extracted: Vec<Vec<(CallSiteRef, Vec<CallTarget>)>> = ids
        .par_iter()
        .map(|id| extract_sites(group, *id))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let extracted: Vec<Vec<(CallSiteRef, Vec<CallTarget>)>> =
        ids.iter().map(|id| extract_sites(group, *id)).collect();

    let mut graph = CallGraph::new();
    for id in &ids {
        graph.add_function(*id);
    }
    for sites in extracted {
        for (site, targets) in sites {
            graph.record_site(site, targets);
        }
    }

    info!(
        functions = graph.function_count(),
        edges = graph.edge_count(),
        unresolved_sites = graph.unresolved_site_count(),
        "call graph built"
    );
    graph
}

/// Call sites of one function with their resolved targets
fn extract_sites(group: &ModuleGroup, id: FunctionId) -> Vec<(CallSiteRef, Vec<CallTarget>)> {
    let Some(function) = group.get(id) else {
        return Vec::new();
    };
    let body = &function.body;
    let def_use = DefUseIndex::build(body);
    let mut sites = Vec::new();

    for (block_idx, block) in body.blocks.iter().enumerate() {
        for (inst_idx, inst) in block.instructions.iter().enumerate() {
            let site = CallSiteRef::new(id, BlockId(block_idx as u32), inst_idx as u32);
            match &inst.op {
                CanonicalOperator::CallDirect { callee, .. } => {
                    sites.push((site, vec![resolve_symbol(group, callee)]));
                }
                CanonicalOperator::CallIndirect { callee, args, .. } => {
                    let targets = resolve_indirect(group, body, &def_use, *callee, args.len());
                    sites.push((site, targets));
                }
                _ => {}
            }
        }
    }
    sites
}

fn resolve_symbol(group: &ModuleGroup, symbol: &str) -> CallTarget {
    match group.resolve(symbol) {
        Some(id) => CallTarget::Resolved(id),
        None => CallTarget::External(symbol.to_string()),
    }
}

fn resolve_indirect(
    group: &ModuleGroup,
    body: &CanonicalFunction,
    def_use: &DefUseIndex,
    callee: ValueId,
    arity: usize,
) -> Vec<CallTarget> {
    if let Some(symbol) = chase_function_ref(body, def_use, callee) {
        return vec![resolve_symbol(group, &symbol)];
    }

    let candidates: Vec<CallTarget> = group
        .model_stub_ids()
        .filter(|id| {
            group
                .get(*id)
                .map(|f| f.body.params().len() == arity)
                .unwrap_or(false)
        })
        .map(CallTarget::Resolved)
        .collect();

    if candidates.is_empty() {
        vec![CallTarget::Unknown]
    } else {
        candidates
    }
}

/// Walk back through assignment chains to a function reference, if one is
/// statically visible
fn chase_function_ref(
    body: &CanonicalFunction,
    def_use: &DefUseIndex,
    value: ValueId,
) -> Option<String> {
    let mut current = value;
    // Chains are acyclic in SSA, but the bound keeps a corrupt input finite
    for _ in 0..body.value_count.max(1) {
        match def_use.def_of(current)? {
            DefSite::BlockParam { .. } => return None,
            DefSite::Inst(site) => {
                let inst = body.instruction_at(site.block, site.index)?;
                match &inst.op {
                    CanonicalOperator::FunctionRef { symbol, .. } => return Some(symbol.clone()),
                    CanonicalOperator::Assign { from, .. } => current = *from,
                    _ => return None,
                }
            }
        }
    }
    None
}
