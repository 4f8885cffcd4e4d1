//! Structure verification pass
//!
//! Establishes the invariants every later pass assumes: all blocks
//! terminated, all block targets in range, single definition per value,
//! every operand defined somewhere in the function. The definedness check is
//! flow-insensitive; the input is SSA from a front end that already ordered
//! defs before uses, and the analysis engines never rely on ordering beyond
//! the def-use edges themselves.

use rustc_hash::FxHashSet;

use crate::features::canonicalizer::domain::{PassContext, RawPass};
use crate::features::canonicalizer::error::CanonicalizationError;
use crate::features::ir::domain::{BlockId, RawFunction, ValueId};

pub struct VerifyStructure;

/// (target, arg count) per outgoing edge; switch edges pass no args
fn branch_edge_args(term: &crate::features::ir::domain::RawTerminator) -> Vec<(BlockId, usize)> {
    use crate::features::ir::domain::RawTerminator;
    match term {
        RawTerminator::Branch { target, args } => vec![(*target, args.len())],
        RawTerminator::CondBranch {
            true_target,
            true_args,
            false_target,
            false_args,
            ..
        } => vec![
            (*true_target, true_args.len()),
            (*false_target, false_args.len()),
        ],
        RawTerminator::Switch { cases, default, .. } => {
            let mut edges: Vec<(BlockId, usize)> = cases.iter().map(|(_, b)| (*b, 0)).collect();
            edges.push((*default, 0));
            edges
        }
        RawTerminator::Return { .. } | RawTerminator::Unreachable => Vec::new(),
    }
}

impl RawPass for VerifyStructure {
    fn name(&self) -> &'static str {
        "verify-structure"
    }

    fn run(
        &self,
        function: RawFunction,
        cx: &PassContext<'_>,
    ) -> Result<RawFunction, CanonicalizationError> {
        if function.blocks.is_empty() {
            return Err(cx.empty_function());
        }

        let block_count = function.blocks.len() as u32;
        let mut defined: FxHashSet<ValueId> = FxHashSet::default();

        // Collect definitions, rejecting duplicates
        for block in &function.blocks {
            for param in &block.params {
                if !defined.insert(param.value) {
                    return Err(cx.duplicate_definition(param.value));
                }
            }
            for inst in &block.instructions {
                if let Some(result) = inst.op.result() {
                    if !defined.insert(result.value) {
                        return Err(cx.duplicate_definition(result.value));
                    }
                }
            }
        }

        // Check operands and control-flow edges
        for (block_idx, block) in function.blocks.iter().enumerate() {
            let block_id = BlockId(block_idx as u32);

            for (inst_idx, inst) in block.instructions.iter().enumerate() {
                for operand in inst.op.operands() {
                    if !defined.contains(&operand) {
                        return Err(cx.undefined_value(block_id, inst_idx as u32, operand));
                    }
                }
            }

            let term_index = block.instructions.len() as u32;
            match &block.terminator {
                None => return Err(cx.missing_terminator(block_id)),
                Some(term) => {
                    for operand in term.operands() {
                        if !defined.contains(&operand) {
                            return Err(cx.undefined_value(block_id, term_index, operand));
                        }
                    }
                    for target in term.targets() {
                        if target.0 >= block_count {
                            return Err(cx.invalid_block_target(block_id, target));
                        }
                    }
                    // Branch args must match target block params; switch edges
                    // carry no args, so only branch-family edges are checked
                    for (target, args) in branch_edge_args(term) {
                        let expected = function.blocks[target.index()].params.len();
                        if args != expected {
                            return Err(cx.block_arg_mismatch(block_id, target, args, expected));
                        }
                    }
                }
            }
        }

        Ok(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir::domain::{FunctionBuilder, IrType, Literal, RawTerminator};

    fn cx() -> PassContext<'static> {
        PassContext::new("m", "f")
    }

    #[test]
    fn test_verify_accepts_well_formed() {
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        let a = fb.literal(Literal::Int(1), IrType::new("Int"));
        fb.ret(Some(a));
        assert!(VerifyStructure.run(fb.finish(), &cx()).is_ok());
    }

    #[test]
    fn test_verify_rejects_missing_terminator() {
        let fb = FunctionBuilder::new("f", IrType::new("Int"));
        let err = VerifyStructure.run(fb.finish(), &cx()).unwrap_err();
        assert!(matches!(
            err,
            CanonicalizationError::MissingTerminator { .. }
        ));
    }

    #[test]
    fn test_verify_rejects_undefined_operand() {
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        fb.ret(None);
        let mut function = fb.finish();
        // Forge a return of a value nobody defines
        function.blocks[0].terminator = Some(RawTerminator::Return {
            operand: Some(ValueId(99)),
        });
        let err = VerifyStructure.run(function, &cx()).unwrap_err();
        assert!(matches!(err, CanonicalizationError::UndefinedValue { .. }));
    }

    #[test]
    fn test_verify_rejects_out_of_range_target() {
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        fb.ret(None);
        let mut function = fb.finish();
        function.blocks[0].terminator = Some(RawTerminator::Branch {
            target: BlockId(7),
            args: vec![],
        });
        let err = VerifyStructure.run(function, &cx()).unwrap_err();
        assert!(matches!(
            err,
            CanonicalizationError::InvalidBlockTarget { .. }
        ));
    }

    #[test]
    fn test_verify_rejects_empty_function() {
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        fb.ret(None);
        let mut function = fb.finish();
        function.blocks.clear();
        let err = VerifyStructure.run(function, &cx()).unwrap_err();
        assert!(matches!(err, CanonicalizationError::EmptyFunction { .. }));
    }
}
