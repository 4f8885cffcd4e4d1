//! Backward propagation
//!
//! From one sink call site's arguments toward sources, along use-def edges.
//! The mirror image of forward mode, used to confirm reachability from the
//! sink end or to prune infeasible forward reports; findings have the same
//! shape either way.
//!
//! Transfer rules, per definition of a tainted value:
//!
//! - assignment / operator result: the operands are tainted
//! - field read result: the (base, field) cell and the base are tainted
//! - block parameter: every branch argument bound to it is tainted; entry
//!   parameters cross to the matching argument at every call site of this
//!   function, unless this function classifies as sanitizer
//! - call result: a source callee records a finding; a sanitizer callee
//!   kills the edge; a resolved plain callee is entered through its return
//!   operands; unresolved and unknown callees taint every argument

use rustc_hash::FxHashSet;

use super::engine::{EngineContext, Seed};
use super::fact_store::{FactStore, PropagationOutcome};
use crate::features::call_graph::domain::{CallSiteRef, CallTarget};
use crate::features::ir::domain::{
    BlockId, CanonicalFunction, CanonicalOperator, CanonicalTerminator, DefSite, InstRef, ValueId,
};
use crate::features::linker::domain::FunctionId;
use crate::features::taint::domain::{AbstractLoc, CallSiteClass, Finding, TaintFact};

pub fn propagate_backward(cx: &EngineContext<'_>, seed: &Seed) -> PropagationOutcome {
    let mut engine = BackwardPropagation {
        cx,
        seed,
        store: FactStore::new(),
        findings: Vec::new(),
        found_sources: FxHashSet::default(),
        incomplete: false,
        processed: 0,
    };
    engine.run();
    PropagationOutcome {
        findings: engine.findings,
        incomplete: engine.incomplete,
        facts_processed: engine.processed,
    }
}

struct BackwardPropagation<'a, 'cx> {
    cx: &'a EngineContext<'cx>,
    seed: &'a Seed,
    store: FactStore,
    findings: Vec<Finding>,
    found_sources: FxHashSet<CallSiteRef>,
    incomplete: bool,
    processed: usize,
}

impl<'a, 'cx> BackwardPropagation<'a, 'cx> {
    fn run(&mut self) {
        for value in &self.seed.values {
            self.store
                .push(TaintFact::value(self.seed.site.function, *value), None, None);
        }

        let mut iterations = 0usize;
        while let Some(fact) = self.store.pop() {
            iterations += 1;
            self.processed += 1;
            if self.processed > self.cx.options.max_facts_per_seed
                || iterations > self.cx.options.max_worklist_iterations
            {
                self.incomplete = true;

                #[cfg(feature = "trace")]
                eprintln!(
                    "[Backward] seed {} exceeded budget after {} facts",
                    self.seed.site, self.processed
                );
                break;
            }
            self.process(&fact);
        }
    }

    fn process(&mut self, fact: &TaintFact) {
        let Some(body) = self.cx.body(fact.function) else {
            return;
        };
        let def_use = self.cx.def_use.get(fact.function, body);

        match &fact.loc {
            AbstractLoc::Value(value) => match def_use.def_of(*value) {
                None => {}
                Some(DefSite::BlockParam { block, index }) => {
                    self.visit_block_param(fact, body, block, index);
                }
                Some(DefSite::Inst(site)) => {
                    self.visit_def(fact, body, site);
                }
            },
            AbstractLoc::Field { base, field } => {
                // Whatever was written into the cell is tainted
                for site in def_use.uses_of(*base) {
                    if let Some(inst) = body.instruction_at(site.block, site.index) {
                        if let CanonicalOperator::FieldWrite {
                            object,
                            field: written_field,
                            value,
                        } = &inst.op
                        {
                            if object == base && written_field == field {
                                self.push_local(fact, AbstractLoc::Value(*value));
                            }
                        }
                    }
                }
            }
        }
    }

    fn visit_block_param(
        &mut self,
        fact: &TaintFact,
        body: &CanonicalFunction,
        block: BlockId,
        position: u32,
    ) {
        if block == BlockId::ENTRY {
            // Function parameter: cross up to every caller's argument
            if self.cx.spec.classify(&body.symbol) == CallSiteClass::Sanitizer {
                return;
            }
            for (caller, call_site) in self.cx.graph.callers_of(fact.function) {
                let Some(inst) = self
                    .cx
                    .body(caller)
                    .and_then(|b| b.instruction_at(call_site.block, call_site.index))
                else {
                    continue;
                };
                let args = match &inst.op {
                    CanonicalOperator::CallDirect { args, .. }
                    | CanonicalOperator::CallIndirect { args, .. } => args,
                    _ => continue,
                };
                if let Some(arg) = args.get(position as usize) {
                    self.push_inter(fact, TaintFact::value(caller, *arg), call_site);
                }
            }
            return;
        }

        // Ordinary block parameter: every branch argument bound to it
        let def_use = self.cx.def_use.get(fact.function, body);
        for term_site in def_use.branch_sites_into(block) {
            let Some(pred) = body.block(term_site.block) else {
                continue;
            };
            for (target, args) in pred.terminator.edge_args() {
                if target != block {
                    continue;
                }
                if let Some(arg) = args.get(position as usize) {
                    self.push_local(fact, AbstractLoc::Value(*arg));
                }
            }
        }
    }

    fn visit_def(&mut self, fact: &TaintFact, body: &CanonicalFunction, site: InstRef) {
        let Some(inst) = body.instruction_at(site.block, site.index) else {
            return;
        };
        match &inst.op {
            CanonicalOperator::Literal { .. } | CanonicalOperator::FunctionRef { .. } => {}
            CanonicalOperator::Assign { from, .. } => {
                self.push_local(fact, AbstractLoc::Value(*from));
            }
            CanonicalOperator::Binary { lhs, rhs, .. } => {
                self.push_local(fact, AbstractLoc::Value(*lhs));
                self.push_local(fact, AbstractLoc::Value(*rhs));
            }
            CanonicalOperator::Unary { operand, .. } => {
                self.push_local(fact, AbstractLoc::Value(*operand));
            }
            CanonicalOperator::FieldRead { object, field, .. } => {
                self.push_local(
                    fact,
                    AbstractLoc::Field {
                        base: *object,
                        field: field.clone(),
                    },
                );
                self.push_local(fact, AbstractLoc::Value(*object));
            }
            CanonicalOperator::FieldWrite { .. } => {}
            CanonicalOperator::CallDirect { args, .. }
            | CanonicalOperator::CallIndirect { args, .. } => {
                self.visit_call_result(fact, site, args);
            }
        }
    }

    /// The tainted value is a call result: walk into where it came from
    fn visit_call_result(&mut self, fact: &TaintFact, site: InstRef, args: &[ValueId]) {
        let site_ref = CallSiteRef::new(fact.function, site.block, site.index);
        for target in self.cx.graph.targets_at(&site_ref) {
            match self.cx.classify(target) {
                CallSiteClass::Source => {
                    self.record_finding(fact, site_ref, target);
                }
                CallSiteClass::Sanitizer => continue,
                CallSiteClass::Sink | CallSiteClass::Plain => match target {
                    CallTarget::Resolved(callee) => {
                        self.enter_returns(fact, *callee, site_ref);
                    }
                    CallTarget::External(_) | CallTarget::Unknown => {
                        // Black box: the result may derive from any argument
                        for arg in args {
                            self.push_local(fact, AbstractLoc::Value(*arg));
                        }
                    }
                },
            }
        }
    }

    /// Descend into a callee through its return operands
    fn enter_returns(&mut self, fact: &TaintFact, callee: FunctionId, via: CallSiteRef) {
        let Some(callee_body) = self.cx.body(callee) else {
            return;
        };
        let def_use = self.cx.def_use.get(callee, callee_body);
        for ret_site in def_use.returns() {
            let Some(block) = callee_body.block(ret_site.block) else {
                continue;
            };
            if let CanonicalTerminator::Return {
                operand: Some(value),
            } = &block.terminator
            {
                self.push_inter(fact, TaintFact::value(callee, *value), via);
            }
        }
    }

    fn record_finding(&mut self, fact: &TaintFact, source: CallSiteRef, target: &CallTarget) {
        if !self.found_sources.insert(source) {
            return;
        }
        let source_symbol = self.cx.target_symbol(target).unwrap_or_default().to_string();
        // Walking provenance from here reaches the sink seed; crossings come
        // out nearest-the-source first, which is already path order
        let mut path = vec![source];
        path.extend(self.store.vias_from(fact));
        path.push(self.seed.site);

        #[cfg(feature = "trace")]
        eprintln!(
            "[Backward] finding: {} -> {} ({} hops)",
            source,
            self.seed.site,
            path.len()
        );

        self.findings.push(Finding::new(
            source,
            self.seed.site,
            source_symbol,
            self.seed.symbol.clone(),
            path,
        ));
    }

    fn push_local(&mut self, parent: &TaintFact, loc: AbstractLoc) {
        self.store.push(
            TaintFact {
                function: parent.function,
                loc,
            },
            Some(parent.clone()),
            None,
        );
    }

    fn push_inter(&mut self, parent: &TaintFact, fact: TaintFact, via: CallSiteRef) {
        self.store.push(fact, Some(parent.clone()), Some(via));
    }
}
