//! Forward propagation
//!
//! From one source call site's result toward sinks, along def-use edges.
//! Transfer rules, per use of a tainted value:
//!
//! - assignment / operator application: the result is tainted
//! - field write: the (base, field) cell is tainted
//! - field read from a tainted base or tainted cell: the result is tainted
//! - branch argument: the target block's parameter is tainted
//! - call argument: the fact enters the callee's matching parameter, unless
//!   the callee classifies as sanitizer, which kills the edge; unresolved
//!   and unknown callees taint the call result instead
//! - return operand: the fact re-emerges at the result of every call site
//!   of this function (the summary-style return edge), unless this
//!   function itself classifies as sanitizer
//!
//! A fact reaching a sink call site's argument records a finding and keeps
//! propagating; one summarized finding per sink site per seed.

use rustc_hash::FxHashSet;

use super::engine::{EngineContext, Seed};
use super::fact_store::{FactStore, PropagationOutcome};
use crate::features::call_graph::domain::{CallSiteRef, CallTarget};
use crate::features::ir::domain::{
    CanonicalFunction, CanonicalOperator, CanonicalTerminator, InstRef, ValueId,
};
use crate::features::taint::domain::{AbstractLoc, CallSiteClass, Finding, TaintFact};

pub fn propagate_forward(cx: &EngineContext<'_>, seed: &Seed) -> PropagationOutcome {
    let mut engine = ForwardPropagation {
        cx,
        seed,
        store: FactStore::new(),
        findings: Vec::new(),
        found_sinks: FxHashSet::default(),
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

struct ForwardPropagation<'a, 'cx> {
    cx: &'a EngineContext<'cx>,
    seed: &'a Seed,
    store: FactStore,
    findings: Vec<Finding>,
    found_sinks: FxHashSet<CallSiteRef>,
    incomplete: bool,
    processed: usize,
}

impl<'a, 'cx> ForwardPropagation<'a, 'cx> {
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
                    "[Forward] seed {} exceeded budget after {} facts",
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
            AbstractLoc::Value(value) => {
                for site in def_use.uses_of(*value) {
                    self.visit_use(fact, *value, *site, body);
                }
            }
            AbstractLoc::Field { base, field } => {
                // Reads of the tainted cell taint their results
                for site in def_use.uses_of(*base) {
                    if let Some(inst) = body.instruction_at(site.block, site.index) {
                        if let CanonicalOperator::FieldRead {
                            result,
                            object,
                            field: read_field,
                        } = &inst.op
                        {
                            if object == base && read_field == field {
                                self.push_local(fact, AbstractLoc::Value(result.value));
                            }
                        }
                    }
                }
            }
        }
    }

    fn visit_use(
        &mut self,
        fact: &TaintFact,
        value: ValueId,
        site: InstRef,
        body: &CanonicalFunction,
    ) {
        if let Some(inst) = body.instruction_at(site.block, site.index) {
            match &inst.op {
                CanonicalOperator::Literal { .. } | CanonicalOperator::FunctionRef { .. } => {}
                CanonicalOperator::Assign { result, .. }
                | CanonicalOperator::Binary { result, .. }
                | CanonicalOperator::Unary { result, .. } => {
                    self.push_local(fact, AbstractLoc::Value(result.value));
                }
                CanonicalOperator::FieldRead { result, object, .. } => {
                    // A tainted base taints any read from it
                    if *object == value {
                        self.push_local(fact, AbstractLoc::Value(result.value));
                    }
                }
                CanonicalOperator::FieldWrite {
                    object,
                    field,
                    value: written,
                } => {
                    if *written == value {
                        self.push_local(
                            fact,
                            AbstractLoc::Field {
                                base: *object,
                                field: field.clone(),
                            },
                        );
                    }
                }
                CanonicalOperator::CallDirect { result, args, .. } => {
                    self.visit_call(fact, value, site, result.value, args);
                }
                CanonicalOperator::CallIndirect { result, args, .. } => {
                    // The callee operand itself carries no data into the call
                    if args.contains(&value) {
                        self.visit_call(fact, value, site, result.value, args);
                    }
                }
            }
            return;
        }

        // Terminator use
        let Some(block) = body.block(site.block) else {
            return;
        };
        match &block.terminator {
            CanonicalTerminator::Branch { .. } | CanonicalTerminator::CondBranch { .. } => {
                for (target, args) in block.terminator.edge_args() {
                    for (position, arg) in args.iter().enumerate() {
                        if *arg != value {
                            continue;
                        }
                        if let Some(param) = body
                            .block(target)
                            .and_then(|b| b.params.get(position))
                        {
                            self.push_local(fact, AbstractLoc::Value(param.value));
                        }
                    }
                }
            }
            CanonicalTerminator::Return { operand } => {
                if *operand == Some(value) {
                    self.visit_return(fact, body);
                }
            }
            CanonicalTerminator::Unreachable => {}
        }
    }

    /// A tainted argument at a call site: record sinks, kill sanitizer
    /// edges, and push the fact across every remaining target
    fn visit_call(
        &mut self,
        fact: &TaintFact,
        value: ValueId,
        site: InstRef,
        result: ValueId,
        args: &[ValueId],
    ) {
        let site_ref = CallSiteRef::new(fact.function, site.block, site.index);
        let positions: Vec<usize> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| **a == value)
            .map(|(j, _)| j)
            .collect();
        if positions.is_empty() {
            return;
        }

        for target in self.cx.graph.targets_at(&site_ref) {
            let class = self.cx.classify(target);
            match class {
                CallSiteClass::Sanitizer => continue,
                CallSiteClass::Sink => {
                    self.record_finding(fact, site_ref, target);
                }
                CallSiteClass::Source | CallSiteClass::Plain => {}
            }

            // Sinks and sources still behave as plain calls for propagation
            match target {
                CallTarget::Resolved(callee) => {
                    let Some(callee_body) = self.cx.body(*callee) else {
                        continue;
                    };
                    let params = callee_body.params();
                    for &position in &positions {
                        match params.get(position) {
                            Some(param) => {
                                self.push_inter(
                                    fact,
                                    TaintFact::value(*callee, param.value),
                                    site_ref,
                                );
                            }
                            // Arity mismatch: fall back to tainting the result
                            None => self.push_local(fact, AbstractLoc::Value(result)),
                        }
                    }
                }
                CallTarget::External(_) | CallTarget::Unknown => {
                    // Black box: any tainted argument may taint the result
                    self.push_local(fact, AbstractLoc::Value(result));
                }
            }
        }
    }

    /// A tainted return operand re-emerges at every call site of this
    /// function, merged per function rather than per call string
    fn visit_return(&mut self, fact: &TaintFact, body: &CanonicalFunction) {
        if self.cx.spec.classify(&body.symbol) == CallSiteClass::Sanitizer {
            return;
        }
        for (caller, call_site) in self.cx.graph.callers_of(fact.function) {
            let Some(result) = self
                .cx
                .body(caller)
                .and_then(|b| b.instruction_at(call_site.block, call_site.index))
                .and_then(|inst| inst.op.result())
            else {
                continue;
            };
            self.push_inter(fact, TaintFact::value(caller, result.value), call_site);
        }
    }

    fn record_finding(&mut self, fact: &TaintFact, sink: CallSiteRef, target: &CallTarget) {
        if !self.found_sinks.insert(sink) {
            return;
        }
        let sink_symbol = self.cx.target_symbol(target).unwrap_or_default().to_string();
        let mut path = vec![self.seed.site];
        let mut vias = self.store.vias_from(fact);
        vias.reverse();
        path.extend(vias);
        path.push(sink);

        #[cfg(feature = "trace")]
        eprintln!(
            "[Forward] finding: {} -> {} ({} hops)",
            self.seed.site,
            sink,
            path.len()
        );

        self.findings.push(Finding::new(
            self.seed.site,
            sink,
            self.seed.symbol.clone(),
            sink_symbol,
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
