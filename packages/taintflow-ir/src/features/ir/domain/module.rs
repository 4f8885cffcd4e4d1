//! Compilation units
//!
//! A module is immutable once produced by its producing stage: the front end
//! builds raw modules, the canonicalizer builds canonical modules, and
//! neither is mutated afterward.

use serde::{Deserialize, Serialize};

use super::function::{CanonicalFunction, RawFunction};
use super::instruction::{
    CanonicalOperator, CanonicalTerminator, RawInstruction, RawOperator, RawTerminator,
};
use super::block::RawBlock;

/// Raw module: the direct translation of one low-level SSA translation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawModule {
    pub name: String,
    pub functions: Vec<RawFunction>,
}

/// Canonical module: the normalized form all downstream analysis consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalModule {
    pub name: String,
    pub functions: Vec<CanonicalFunction>,
}

impl CanonicalModule {
    pub fn function(&self, symbol: &str) -> Option<&CanonicalFunction> {
        self.functions.iter().find(|f| f.symbol == symbol)
    }
}

/// Re-embed a canonical module into raw form.
///
/// Every canonical function is a valid raw function; this is the lossless
/// direction and exists so already-canonical input can be fed back through
/// the pass pipeline (the idempotence property).
impl From<&CanonicalModule> for RawModule {
    fn from(module: &CanonicalModule) -> Self {
        RawModule {
            name: module.name.clone(),
            functions: module
                .functions
                .iter()
                .map(|f| RawFunction {
                    symbol: f.symbol.clone(),
                    return_type: f.return_type.clone(),
                    attributes: f.attributes.clone(),
                    blocks: f
                        .blocks
                        .iter()
                        .map(|b| RawBlock {
                            params: b.params.clone(),
                            instructions: b
                                .instructions
                                .iter()
                                .map(|inst| RawInstruction {
                                    op: raw_op(&inst.op),
                                    loc: inst.loc,
                                })
                                .collect(),
                            terminator: Some(raw_terminator(&b.terminator)),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

fn raw_op(op: &CanonicalOperator) -> RawOperator {
    match op.clone() {
        CanonicalOperator::Literal { result, literal } => RawOperator::Literal { result, literal },
        CanonicalOperator::Assign { result, from } => RawOperator::Assign { result, from },
        CanonicalOperator::Binary {
            result,
            op,
            lhs,
            rhs,
        } => RawOperator::Binary {
            result,
            op,
            lhs,
            rhs,
        },
        CanonicalOperator::Unary {
            result,
            op,
            operand,
        } => RawOperator::Unary {
            result,
            op,
            operand,
        },
        CanonicalOperator::FieldRead {
            result,
            object,
            field,
        } => RawOperator::FieldRead {
            result,
            object,
            field,
        },
        CanonicalOperator::FieldWrite {
            object,
            field,
            value,
        } => RawOperator::FieldWrite {
            object,
            field,
            value,
        },
        CanonicalOperator::FunctionRef { result, symbol } => {
            RawOperator::FunctionRef { result, symbol }
        }
        CanonicalOperator::CallDirect {
            result,
            callee,
            args,
        } => RawOperator::CallDirect {
            result,
            callee,
            args,
        },
        CanonicalOperator::CallIndirect {
            result,
            callee,
            args,
        } => RawOperator::CallIndirect {
            result,
            callee,
            args,
        },
    }
}

fn raw_terminator(term: &CanonicalTerminator) -> RawTerminator {
    match term.clone() {
        CanonicalTerminator::Branch { target, args } => RawTerminator::Branch { target, args },
        CanonicalTerminator::CondBranch {
            condition,
            true_target,
            true_args,
            false_target,
            false_args,
        } => RawTerminator::CondBranch {
            condition,
            true_target,
            true_args,
            false_target,
            false_args,
        },
        CanonicalTerminator::Return { operand } => RawTerminator::Return { operand },
        CanonicalTerminator::Unreachable => RawTerminator::Unreachable,
    }
}
