//! Operator lowering pass
//!
//! Rewrites the raw-only forms into the canonical operator set:
//!
//! - `Switch` terminators become a chain of equality tests and conditional
//!   branches, with fresh comparison blocks appended at the end of the
//!   function.
//! - `Unknown` instructions fail the module with UnsupportedInstruction;
//!   there is nothing sound to lower them to.
//!
//! Runs after simplify-cfg, so no fresh blocks are spent on dead switches.

use crate::features::canonicalizer::domain::{PassContext, RawPass};
use crate::features::canonicalizer::error::CanonicalizationError;
use crate::features::ir::domain::{
    BinOp, BlockId, IrType, Literal, RawBlock, RawFunction, RawInstruction, RawOperator,
    RawTerminator, ValueDef, ValueId,
};

pub struct LowerOperators;

fn literal_type(literal: &Literal) -> IrType {
    match literal {
        Literal::Int(_) => IrType::new("Int"),
        Literal::Float(_) => IrType::new("Float"),
        Literal::String(_) => IrType::new("String"),
    }
}

fn max_value_id(function: &RawFunction) -> u32 {
    let mut max = 0;
    for block in &function.blocks {
        for param in &block.params {
            max = max.max(param.value.0 + 1);
        }
        for inst in &block.instructions {
            if let Some(result) = inst.op.result() {
                max = max.max(result.value.0 + 1);
            }
        }
    }
    max
}

impl RawPass for LowerOperators {
    fn name(&self) -> &'static str {
        "lower-operators"
    }

    fn run(
        &self,
        mut function: RawFunction,
        cx: &PassContext<'_>,
    ) -> Result<RawFunction, CanonicalizationError> {
        for (block_idx, block) in function.blocks.iter().enumerate() {
            for (inst_idx, inst) in block.instructions.iter().enumerate() {
                if let RawOperator::Unknown { name, .. } = &inst.op {
                    return Err(cx.unsupported_instruction(
                        BlockId(block_idx as u32),
                        inst_idx as u32,
                        name,
                    ));
                }
            }
        }

        let mut next_value = max_value_id(&function);
        let mut fresh_value = |ty: IrType| {
            let def = ValueDef::new(ValueId(next_value), ty);
            next_value += 1;
            def
        };

        let mut appended: Vec<RawBlock> = Vec::new();
        let block_count = function.blocks.len();

        for block in function.blocks.iter_mut() {
            let Some(RawTerminator::Switch {
                operand,
                cases,
                default,
            }) = block.terminator.clone()
            else {
                continue;
            };

            if cases.is_empty() {
                block.terminator = Some(RawTerminator::Branch {
                    target: default,
                    args: vec![],
                });
                continue;
            }

            // First comparison lives in the switch block itself; every
            // further case gets a fresh chain block, appended after the
            // existing blocks
            let last = cases.len() - 1;
            let first_fresh = block_count + appended.len();
            let mut chain: Vec<RawBlock> = Vec::with_capacity(last);

            for (case_idx, (case_literal, case_target)) in cases.into_iter().enumerate() {
                let literal_def = fresh_value(literal_type(&case_literal));
                let literal_value = literal_def.value;
                let literal_inst = RawInstruction::new(RawOperator::Literal {
                    result: literal_def,
                    literal: case_literal,
                });

                let cond_def = fresh_value(IrType::new("Bool"));
                let cond_value = cond_def.value;
                let compare_inst = RawInstruction::new(RawOperator::Binary {
                    result: cond_def,
                    op: BinOp::Eq,
                    lhs: operand,
                    rhs: literal_value,
                });

                let false_target = if case_idx == last {
                    default
                } else {
                    BlockId((first_fresh + case_idx) as u32)
                };
                let terminator = RawTerminator::CondBranch {
                    condition: cond_value,
                    true_target: case_target,
                    true_args: vec![],
                    false_target,
                    false_args: vec![],
                };

                if case_idx == 0 {
                    block.instructions.push(literal_inst);
                    block.instructions.push(compare_inst);
                    block.terminator = Some(terminator);
                } else {
                    chain.push(RawBlock {
                        params: vec![],
                        instructions: vec![literal_inst, compare_inst],
                        terminator: Some(terminator),
                    });
                }
            }
            appended.extend(chain);
        }

        function.blocks.extend(appended);
        Ok(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir::domain::FunctionBuilder;

    fn cx() -> PassContext<'static> {
        PassContext::new("m", "f")
    }

    #[test]
    fn test_unknown_instruction_rejected() {
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        fb.unknown("weird_intrinsic", None);
        fb.ret(None);
        let err = LowerOperators.run(fb.finish(), &cx()).unwrap_err();
        match err {
            CanonicalizationError::UnsupportedInstruction { name, .. } => {
                assert_eq!(name, "weird_intrinsic");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_switch_lowered_to_cond_branch_chain() {
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        let b1 = fb.add_block();
        let b2 = fb.add_block();
        let fallback = fb.add_block();
        let x = fb.literal(Literal::Int(2), IrType::new("Int"));
        fb.switch(
            x,
            vec![(Literal::Int(1), b1), (Literal::Int(2), b2)],
            fallback,
        );
        for b in [b1, b2, fallback] {
            fb.switch_to(b);
            fb.ret(None);
        }

        let lowered = LowerOperators.run(fb.finish(), &cx()).unwrap();

        // One chain block appended for the second case
        assert_eq!(lowered.blocks.len(), 5);
        // No switch survives
        for block in &lowered.blocks {
            assert!(!matches!(
                block.terminator,
                Some(RawTerminator::Switch { .. })
            ));
        }
        // Entry now ends in a conditional branch on an equality test
        let entry_term = lowered.blocks[0].terminator.as_ref().unwrap();
        assert!(matches!(entry_term, RawTerminator::CondBranch { .. }));
    }

    #[test]
    fn test_empty_switch_becomes_branch() {
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        let fallback = fb.add_block();
        let x = fb.literal(Literal::Int(0), IrType::new("Int"));
        fb.switch(x, vec![], fallback);
        fb.switch_to(fallback);
        fb.ret(None);

        let lowered = LowerOperators.run(fb.finish(), &cx()).unwrap();
        assert!(matches!(
            lowered.blocks[0].terminator,
            Some(RawTerminator::Branch { .. })
        ));
    }

    #[test]
    fn test_identity_on_canonical_operators() {
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        let a = fb.literal(Literal::Int(1), IrType::new("Int"));
        let b = fb.assign(a, IrType::new("Int"));
        fb.ret(Some(b));
        let input = fb.finish();

        let output = LowerOperators.run(input.clone(), &cx()).unwrap();
        assert_eq!(input, output);
    }
}
