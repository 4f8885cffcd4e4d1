//! Call graph representation
//!
//! Nodes are functions of the module group plus one synthetic
//! modeled-unknown node; edge weights are the call sites that induce them.
//! The per-site resolution (a site may have several candidate targets after
//! the indirect heuristic) is kept alongside the graph because the taint
//! engines consult sites, not edges.

use ahash::AHashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::features::ir::domain::BlockId;
use crate::features::linker::domain::FunctionId;

/// Position of one call instruction within the module group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallSiteRef {
    pub function: FunctionId,
    pub block: BlockId,
    pub index: u32,
}

impl CallSiteRef {
    pub fn new(function: FunctionId, block: BlockId, index: u32) -> Self {
        Self {
            function,
            block,
            index,
        }
    }
}

impl std::fmt::Display for CallSiteRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}[{}]", self.function, self.block, self.index)
    }
}

/// Resolution of one call site's callee
///
/// The tagged variant keeps the propagation step exhaustive: every match on
/// a target must say what it does with an unresolved or unknown callee.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallTarget {
    /// Definition present in the group
    Resolved(FunctionId),
    /// Named symbol no module defines; kept for exact specification
    /// matching, treated as a conservative black box by the engines
    External(String),
    /// Indirect call with no matching candidate at all
    Unknown,
}

/// Graph node: a group function or the synthetic unknown sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallNode {
    Function(FunctionId),
    Unknown,
}

/// The derived call graph
#[derive(Debug, Clone)]
pub struct CallGraph {
    graph: DiGraph<CallNode, CallSiteRef>,
    indices: FxHashMap<FunctionId, NodeIndex>,
    unknown: NodeIndex,
    sites: AHashMap<CallSiteRef, Vec<CallTarget>>,
    unresolved_sites: usize,
}

impl CallGraph {
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let unknown = graph.add_node(CallNode::Unknown);
        Self {
            graph,
            indices: FxHashMap::default(),
            unknown,
            sites: AHashMap::new(),
            unresolved_sites: 0,
        }
    }

    pub(crate) fn add_function(&mut self, id: FunctionId) {
        if !self.indices.contains_key(&id) {
            let index = self.graph.add_node(CallNode::Function(id));
            self.indices.insert(id, index);
        }
    }

    /// Record one call site's resolution and materialize its edges
    pub(crate) fn record_site(&mut self, site: CallSiteRef, targets: Vec<CallTarget>) {
        let caller = self.indices[&site.function];
        let mut unresolved = false;
        for target in &targets {
            match target {
                CallTarget::Resolved(callee) => {
                    let callee_index = self.indices[callee];
                    self.graph.add_edge(caller, callee_index, site);
                }
                CallTarget::External(_) | CallTarget::Unknown => {
                    self.graph.add_edge(caller, self.unknown, site);
                    unresolved = true;
                }
            }
        }
        if unresolved {
            self.unresolved_sites += 1;
        }
        self.sites.insert(site, targets);
    }

    /// Candidate targets of a call site; empty for sites the builder never
    /// saw (not a call instruction)
    pub fn targets_at(&self, site: &CallSiteRef) -> &[CallTarget] {
        self.sites.get(site).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All resolved callees of a function, deduplicated
    pub fn callees_of(&self, id: FunctionId) -> Vec<FunctionId> {
        let Some(&index) = self.indices.get(&id) else {
            return Vec::new();
        };
        let mut callees: Vec<FunctionId> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .filter_map(|n| match self.graph[n] {
                CallNode::Function(f) => Some(f),
                CallNode::Unknown => None,
            })
            .collect();
        callees.sort();
        callees.dedup();
        callees
    }

    /// Incoming resolved edges: every (caller, call site) that targets `id`
    pub fn callers_of(&self, id: FunctionId) -> Vec<(FunctionId, CallSiteRef)> {
        let Some(&index) = self.indices.get(&id) else {
            return Vec::new();
        };
        let mut callers: Vec<(FunctionId, CallSiteRef)> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .filter_map(|edge| {
                let source = self.graph[edge.source()];
                match source {
                    CallNode::Function(f) => Some((f, *edge.weight())),
                    CallNode::Unknown => None,
                }
            })
            .collect();
        callers.sort();
        callers.dedup();
        callers
    }

    /// Every edge of the graph, with `None` standing for the unknown node
    pub fn edges(&self) -> Vec<(FunctionId, CallSiteRef, Option<FunctionId>)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (source, target) = self.graph.edge_endpoints(e)?;
                let CallNode::Function(caller) = self.graph[source] else {
                    return None;
                };
                let callee = match self.graph[target] {
                    CallNode::Function(f) => Some(f),
                    CallNode::Unknown => None,
                };
                Some((caller, self.graph[e], callee))
            })
            .collect()
    }

    pub fn contains(&self, id: FunctionId) -> bool {
        self.indices.contains_key(&id)
    }

    pub fn function_ids(&self) -> Vec<FunctionId> {
        let mut ids: Vec<FunctionId> = self.indices.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn function_count(&self) -> usize {
        self.indices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Call sites whose callee could not be resolved to a group function
    pub fn unresolved_site_count(&self) -> usize {
        self.unresolved_sites
    }

    /// All recorded call sites, ordered for deterministic iteration
    pub fn call_sites(&self) -> Vec<CallSiteRef> {
        let mut sites: Vec<CallSiteRef> = self.sites.keys().copied().collect();
        sites.sort();
        sites
    }
}

impl Default for CallGraph {
    fn default() -> Self {
        Self::new()
    }
}
