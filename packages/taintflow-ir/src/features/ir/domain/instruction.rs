//! Instruction variants for both IR forms
//!
//! The raw operator set is a superset of the canonical one: `Unknown` covers
//! input instructions the translation does not model (rejected during
//! canonicalization), and the `Switch` terminator is lowered into a chain of
//! conditional branches. Everything else carries over 1:1.

use serde::{Deserialize, Serialize};

use super::block::BlockId;
use super::value::{BinOp, Literal, UnaryOp, ValueDef, ValueId};
use crate::shared::models::Loc;

/// Operators of the raw (directly-translated) form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawOperator {
    /// Construct a literal constant
    Literal { result: ValueDef, literal: Literal },
    /// Copy a value
    Assign { result: ValueDef, from: ValueId },
    /// Binary operator application
    Binary {
        result: ValueDef,
        op: BinOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    /// Unary operator application
    Unary {
        result: ValueDef,
        op: UnaryOp,
        operand: ValueId,
    },
    /// Field-like read: `result = object.field`
    FieldRead {
        result: ValueDef,
        object: ValueId,
        field: String,
    },
    /// Field-like write: `object.field = value`
    FieldWrite {
        object: ValueId,
        field: String,
        value: ValueId,
    },
    /// Materialize a function as a first-class value
    FunctionRef { result: ValueDef, symbol: String },
    /// Direct call to a qualified symbol
    CallDirect {
        result: ValueDef,
        callee: String,
        args: Vec<ValueId>,
    },
    /// Indirect (apply) call through a function value
    CallIndirect {
        result: ValueDef,
        callee: ValueId,
        args: Vec<ValueId>,
    },
    /// Input instruction the translation does not model.
    /// Canonicalization rejects the containing module.
    Unknown {
        result: Option<ValueDef>,
        name: String,
    },
}

/// Terminators of the raw form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawTerminator {
    /// Unconditional branch, passing block arguments
    Branch { target: BlockId, args: Vec<ValueId> },
    /// Two-way conditional branch
    CondBranch {
        condition: ValueId,
        true_target: BlockId,
        true_args: Vec<ValueId>,
        false_target: BlockId,
        false_args: Vec<ValueId>,
    },
    /// Multi-way switch on a literal discriminant (raw only; lowered)
    Switch {
        operand: ValueId,
        cases: Vec<(Literal, BlockId)>,
        default: BlockId,
    },
    Return { operand: Option<ValueId> },
    Unreachable,
}

/// One raw instruction with its optional source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInstruction {
    pub op: RawOperator,
    pub loc: Option<Loc>,
}

impl RawInstruction {
    pub fn new(op: RawOperator) -> Self {
        Self { op, loc: None }
    }

    pub fn with_loc(op: RawOperator, loc: Loc) -> Self {
        Self { op, loc: Some(loc) }
    }
}

impl RawOperator {
    /// The value this operator defines, if any
    pub fn result(&self) -> Option<&ValueDef> {
        match self {
            RawOperator::Literal { result, .. }
            | RawOperator::Assign { result, .. }
            | RawOperator::Binary { result, .. }
            | RawOperator::Unary { result, .. }
            | RawOperator::FieldRead { result, .. }
            | RawOperator::FunctionRef { result, .. }
            | RawOperator::CallDirect { result, .. }
            | RawOperator::CallIndirect { result, .. } => Some(result),
            RawOperator::FieldWrite { .. } => None,
            RawOperator::Unknown { result, .. } => result.as_ref(),
        }
    }

    /// All values this operator reads
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            RawOperator::Literal { .. }
            | RawOperator::FunctionRef { .. }
            | RawOperator::Unknown { .. } => Vec::new(),
            RawOperator::Assign { from, .. } => vec![*from],
            RawOperator::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            RawOperator::Unary { operand, .. } => vec![*operand],
            RawOperator::FieldRead { object, .. } => vec![*object],
            RawOperator::FieldWrite { object, value, .. } => vec![*object, *value],
            RawOperator::CallDirect { args, .. } => args.clone(),
            RawOperator::CallIndirect { callee, args, .. } => {
                let mut vals = vec![*callee];
                vals.extend_from_slice(args);
                vals
            }
        }
    }
}

impl RawTerminator {
    /// Successor blocks of this terminator
    pub fn targets(&self) -> Vec<BlockId> {
        match self {
            RawTerminator::Branch { target, .. } => vec![*target],
            RawTerminator::CondBranch {
                true_target,
                false_target,
                ..
            } => vec![*true_target, *false_target],
            RawTerminator::Switch { cases, default, .. } => {
                let mut ts: Vec<BlockId> = cases.iter().map(|(_, b)| *b).collect();
                ts.push(*default);
                ts
            }
            RawTerminator::Return { .. } | RawTerminator::Unreachable => Vec::new(),
        }
    }

    /// All values this terminator reads
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            RawTerminator::Branch { args, .. } => args.clone(),
            RawTerminator::CondBranch {
                condition,
                true_args,
                false_args,
                ..
            } => {
                let mut vals = vec![*condition];
                vals.extend_from_slice(true_args);
                vals.extend_from_slice(false_args);
                vals
            }
            RawTerminator::Switch { operand, .. } => vec![*operand],
            RawTerminator::Return { operand } => operand.iter().copied().collect(),
            RawTerminator::Unreachable => Vec::new(),
        }
    }

    /// Rewrite every block target through `map`
    pub fn retarget(&mut self, map: impl Fn(BlockId) -> BlockId) {
        match self {
            RawTerminator::Branch { target, .. } => *target = map(*target),
            RawTerminator::CondBranch {
                true_target,
                false_target,
                ..
            } => {
                *true_target = map(*true_target);
                *false_target = map(*false_target);
            }
            RawTerminator::Switch { cases, default, .. } => {
                for (_, b) in cases.iter_mut() {
                    *b = map(*b);
                }
                *default = map(*default);
            }
            RawTerminator::Return { .. } | RawTerminator::Unreachable => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical form
// ---------------------------------------------------------------------------

/// Operators of the canonical form: the closed set analysis matches on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanonicalOperator {
    Literal {
        result: ValueDef,
        literal: Literal,
    },
    Assign {
        result: ValueDef,
        from: ValueId,
    },
    Binary {
        result: ValueDef,
        op: BinOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    Unary {
        result: ValueDef,
        op: UnaryOp,
        operand: ValueId,
    },
    FieldRead {
        result: ValueDef,
        object: ValueId,
        field: String,
    },
    FieldWrite {
        object: ValueId,
        field: String,
        value: ValueId,
    },
    FunctionRef {
        result: ValueDef,
        symbol: String,
    },
    CallDirect {
        result: ValueDef,
        callee: String,
        args: Vec<ValueId>,
    },
    CallIndirect {
        result: ValueDef,
        callee: ValueId,
        args: Vec<ValueId>,
    },
}

/// Terminators of the canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanonicalTerminator {
    Branch {
        target: BlockId,
        args: Vec<ValueId>,
    },
    CondBranch {
        condition: ValueId,
        true_target: BlockId,
        true_args: Vec<ValueId>,
        false_target: BlockId,
        false_args: Vec<ValueId>,
    },
    Return {
        operand: Option<ValueId>,
    },
    Unreachable,
}

/// One canonical instruction with its optional source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalInstruction {
    pub op: CanonicalOperator,
    pub loc: Option<Loc>,
}

impl CanonicalOperator {
    /// The value this operator defines, if any
    pub fn result(&self) -> Option<&ValueDef> {
        match self {
            CanonicalOperator::Literal { result, .. }
            | CanonicalOperator::Assign { result, .. }
            | CanonicalOperator::Binary { result, .. }
            | CanonicalOperator::Unary { result, .. }
            | CanonicalOperator::FieldRead { result, .. }
            | CanonicalOperator::FunctionRef { result, .. }
            | CanonicalOperator::CallDirect { result, .. }
            | CanonicalOperator::CallIndirect { result, .. } => Some(result),
            CanonicalOperator::FieldWrite { .. } => None,
        }
    }

    /// All values this operator reads
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            CanonicalOperator::Literal { .. } | CanonicalOperator::FunctionRef { .. } => Vec::new(),
            CanonicalOperator::Assign { from, .. } => vec![*from],
            CanonicalOperator::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            CanonicalOperator::Unary { operand, .. } => vec![*operand],
            CanonicalOperator::FieldRead { object, .. } => vec![*object],
            CanonicalOperator::FieldWrite { object, value, .. } => vec![*object, *value],
            CanonicalOperator::CallDirect { args, .. } => args.clone(),
            CanonicalOperator::CallIndirect { callee, args, .. } => {
                let mut vals = vec![*callee];
                vals.extend_from_slice(args);
                vals
            }
        }
    }

    /// True for direct and indirect calls
    pub fn is_call(&self) -> bool {
        matches!(
            self,
            CanonicalOperator::CallDirect { .. } | CanonicalOperator::CallIndirect { .. }
        )
    }
}

impl CanonicalTerminator {
    /// Successor blocks of this terminator
    pub fn targets(&self) -> Vec<BlockId> {
        match self {
            CanonicalTerminator::Branch { target, .. } => vec![*target],
            CanonicalTerminator::CondBranch {
                true_target,
                false_target,
                ..
            } => vec![*true_target, *false_target],
            CanonicalTerminator::Return { .. } | CanonicalTerminator::Unreachable => Vec::new(),
        }
    }

    /// All values this terminator reads
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            CanonicalTerminator::Branch { args, .. } => args.clone(),
            CanonicalTerminator::CondBranch {
                condition,
                true_args,
                false_args,
                ..
            } => {
                let mut vals = vec![*condition];
                vals.extend_from_slice(true_args);
                vals.extend_from_slice(false_args);
                vals
            }
            CanonicalTerminator::Return { operand } => operand.iter().copied().collect(),
            CanonicalTerminator::Unreachable => Vec::new(),
        }
    }

    /// Block-argument lists per successor edge, in target order
    pub fn edge_args(&self) -> Vec<(BlockId, &[ValueId])> {
        match self {
            CanonicalTerminator::Branch { target, args } => vec![(*target, args.as_slice())],
            CanonicalTerminator::CondBranch {
                true_target,
                true_args,
                false_target,
                false_args,
                ..
            } => vec![
                (*true_target, true_args.as_slice()),
                (*false_target, false_args.as_slice()),
            ],
            CanonicalTerminator::Return { .. } | CanonicalTerminator::Unreachable => Vec::new(),
        }
    }
}
