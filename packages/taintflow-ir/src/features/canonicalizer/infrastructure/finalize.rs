//! Finalization: dense value renumbering and conversion to canonical types
//!
//! Values are renumbered in a single deterministic order (blocks in order;
//! within a block, parameters then instruction results), so identical input
//! always yields an identical canonical function, and re-finalizing a
//! canonical function is the identity. Direct-call and function-reference
//! symbols are collected here for the linker's resolution audit.

use rustc_hash::FxHashMap;

use crate::features::canonicalizer::domain::PassContext;
use crate::features::canonicalizer::error::CanonicalizationError;
use crate::features::ir::domain::{
    BlockId, CanonicalBlock, CanonicalFunction, CanonicalInstruction, CanonicalOperator,
    CanonicalTerminator, RawFunction, RawOperator, RawTerminator, ValueDef, ValueId,
};

pub fn finalize(
    function: RawFunction,
    cx: &PassContext<'_>,
) -> Result<CanonicalFunction, CanonicalizationError> {
    // Dense renumbering map in definition order
    let mut remap: FxHashMap<ValueId, ValueId> = FxHashMap::default();
    let mut next: u32 = 0;
    for block in &function.blocks {
        for param in &block.params {
            remap.insert(param.value, ValueId(next));
            next += 1;
        }
        for inst in &block.instructions {
            if let Some(result) = inst.op.result() {
                remap.insert(result.value, ValueId(next));
                next += 1;
            }
        }
    }

    let value_count = next;
    let mut called_symbols: Vec<String> = Vec::new();

    let lookup = |value: ValueId, block: BlockId, index: u32| -> Result<ValueId, CanonicalizationError> {
        remap
            .get(&value)
            .copied()
            .ok_or_else(|| cx.undefined_value(block, index, value))
    };

    let mut blocks: Vec<CanonicalBlock> = Vec::with_capacity(function.blocks.len());
    for (block_idx, block) in function.blocks.into_iter().enumerate() {
        let block_id = BlockId(block_idx as u32);

        let params: Vec<ValueDef> = block
            .params
            .into_iter()
            .map(|p| ValueDef::new(remap[&p.value], p.ty))
            .collect();

        let mut instructions: Vec<CanonicalInstruction> =
            Vec::with_capacity(block.instructions.len());
        for (inst_idx, inst) in block.instructions.into_iter().enumerate() {
            let index = inst_idx as u32;
            let map = |v: ValueId| lookup(v, block_id, index);
            let map_def =
                |d: ValueDef| -> ValueDef { ValueDef::new(remap[&d.value], d.ty) };

            let op = match inst.op {
                RawOperator::Literal { result, literal } => CanonicalOperator::Literal {
                    result: map_def(result),
                    literal,
                },
                RawOperator::Assign { result, from } => CanonicalOperator::Assign {
                    result: map_def(result),
                    from: map(from)?,
                },
                RawOperator::Binary {
                    result,
                    op,
                    lhs,
                    rhs,
                } => CanonicalOperator::Binary {
                    result: map_def(result),
                    op,
                    lhs: map(lhs)?,
                    rhs: map(rhs)?,
                },
                RawOperator::Unary {
                    result,
                    op,
                    operand,
                } => CanonicalOperator::Unary {
                    result: map_def(result),
                    op,
                    operand: map(operand)?,
                },
                RawOperator::FieldRead {
                    result,
                    object,
                    field,
                } => CanonicalOperator::FieldRead {
                    result: map_def(result),
                    object: map(object)?,
                    field,
                },
                RawOperator::FieldWrite {
                    object,
                    field,
                    value,
                } => CanonicalOperator::FieldWrite {
                    object: map(object)?,
                    field,
                    value: map(value)?,
                },
                RawOperator::FunctionRef { result, symbol } => {
                    called_symbols.push(symbol.clone());
                    CanonicalOperator::FunctionRef {
                        result: map_def(result),
                        symbol,
                    }
                }
                RawOperator::CallDirect {
                    result,
                    callee,
                    args,
                } => {
                    called_symbols.push(callee.clone());
                    CanonicalOperator::CallDirect {
                        result: map_def(result),
                        callee,
                        args: args.into_iter().map(map).collect::<Result<_, _>>()?,
                    }
                }
                RawOperator::CallIndirect {
                    result,
                    callee,
                    args,
                } => CanonicalOperator::CallIndirect {
                    result: map_def(result),
                    callee: map(callee)?,
                    args: args.into_iter().map(map).collect::<Result<_, _>>()?,
                },
                RawOperator::Unknown { name, .. } => {
                    return Err(cx.unsupported_instruction(block_id, index, &name));
                }
            };
            instructions.push(CanonicalInstruction { op, loc: inst.loc });
        }

        let term_index = instructions.len() as u32;
        let map = |v: ValueId| lookup(v, block_id, term_index);
        let terminator = match block.terminator {
            None => return Err(cx.missing_terminator(block_id)),
            Some(RawTerminator::Branch { target, args }) => CanonicalTerminator::Branch {
                target,
                args: args.into_iter().map(map).collect::<Result<_, _>>()?,
            },
            Some(RawTerminator::CondBranch {
                condition,
                true_target,
                true_args,
                false_target,
                false_args,
            }) => CanonicalTerminator::CondBranch {
                condition: map(condition)?,
                true_target,
                true_args: true_args.into_iter().map(map).collect::<Result<_, _>>()?,
                false_target,
                false_args: false_args.into_iter().map(map).collect::<Result<_, _>>()?,
            },
            Some(RawTerminator::Switch { .. }) => {
                return Err(cx.unsupported_instruction(block_id, term_index, "switch"));
            }
            Some(RawTerminator::Return { operand }) => CanonicalTerminator::Return {
                operand: operand.map(map).transpose()?,
            },
            Some(RawTerminator::Unreachable) => CanonicalTerminator::Unreachable,
        };

        blocks.push(CanonicalBlock {
            params,
            instructions,
            terminator,
        });
    }

    called_symbols.sort();
    called_symbols.dedup();

    Ok(CanonicalFunction {
        symbol: function.symbol,
        return_type: function.return_type,
        blocks,
        attributes: function.attributes,
        called_symbols,
        value_count,
    })
}
