//! Shared propagation machinery
//!
//! Both engines drive the same fact store: a FIFO worklist, the
//! per-function seen sets that make revisits no-ops, and a provenance map
//! from which witness paths are reconstructed after the per-function merge
//! has collapsed individual propagation steps.

use ahash::AHashMap;
use std::collections::VecDeque;

use crate::features::call_graph::domain::CallSiteRef;
use crate::features::taint::domain::{Finding, SummaryTable, TaintFact};

/// How a fact came to be: its predecessor fact, and the call site crossed
/// if the step was interprocedural
#[derive(Debug)]
struct Parent {
    fact: Option<TaintFact>,
    via: Option<CallSiteRef>,
}

/// Worklist, seen sets, and provenance of one propagation
#[derive(Debug, Default)]
pub struct FactStore {
    seen: SummaryTable,
    provenance: AHashMap<TaintFact, Parent>,
    worklist: VecDeque<TaintFact>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a fact unless its function has already seen it.
    /// `via` records an interprocedural crossing; intra-function steps pass
    /// `None` and leave no mark on the witness path.
    pub fn push(
        &mut self,
        fact: TaintFact,
        parent: Option<TaintFact>,
        via: Option<CallSiteRef>,
    ) -> bool {
        if !self.seen.insert(&fact) {
            return false;
        }
        self.provenance
            .insert(fact.clone(), Parent { fact: parent, via });
        self.worklist.push_back(fact);
        true
    }

    pub fn pop(&mut self) -> Option<TaintFact> {
        self.worklist.pop_front()
    }

    /// Interprocedural crossings on the chain from `fact` back to its seed,
    /// nearest crossing first
    pub fn vias_from(&self, fact: &TaintFact) -> Vec<CallSiteRef> {
        let mut vias = Vec::new();
        let mut current = Some(fact.clone());
        while let Some(f) = current {
            let Some(parent) = self.provenance.get(&f) else {
                break;
            };
            if let Some(via) = parent.via {
                vias.push(via);
            }
            current = parent.fact.clone();
        }
        vias
    }

    pub fn seen(&self) -> &SummaryTable {
        &self.seen
    }
}

/// What one seed's propagation produced
#[derive(Debug, Default)]
pub struct PropagationOutcome {
    pub findings: Vec<Finding>,
    pub incomplete: bool,
    pub facts_processed: usize,
}
