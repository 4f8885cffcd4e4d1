//! Control-flow simplification pass
//!
//! Two normalizations, in one traversal over an already-verified function:
//!
//! - Empty forwarding blocks (no params, no instructions, unconditional
//!   branch with no args) are bypassed: every edge into one is redirected to
//!   its final non-trivial target. Cycles of forwarding blocks are left
//!   alone; they encode an infinite loop.
//! - Blocks unreachable from the entry are dropped and the survivors
//!   compacted, preserving original order. Block 0 stays the entry.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::features::canonicalizer::domain::{PassContext, RawPass};
use crate::features::canonicalizer::error::CanonicalizationError;
use crate::features::ir::domain::{BlockId, RawBlock, RawFunction, RawTerminator};

pub struct SimplifyCfg;

fn is_forwarding(block: &RawBlock) -> bool {
    block.params.is_empty()
        && block.instructions.is_empty()
        && matches!(
            block.terminator,
            Some(RawTerminator::Branch { ref args, .. }) if args.is_empty()
        )
}

/// Final non-forwarding target of `start`, or `start` itself on a cycle
fn chase(start: BlockId, blocks: &[RawBlock]) -> BlockId {
    let mut seen: FxHashSet<BlockId> = FxHashSet::default();
    let mut current = start;
    loop {
        if !seen.insert(current) {
            return start;
        }
        let block = &blocks[current.index()];
        if is_forwarding(block) {
            if let Some(RawTerminator::Branch { target, .. }) = block.terminator {
                current = target;
                continue;
            }
        }
        return current;
    }
}

impl RawPass for SimplifyCfg {
    fn name(&self) -> &'static str {
        "simplify-cfg"
    }

    fn run(
        &self,
        mut function: RawFunction,
        _cx: &PassContext<'_>,
    ) -> Result<RawFunction, CanonicalizationError> {
        // Redirect every edge past forwarding blocks
        let forward: FxHashMap<BlockId, BlockId> = (0..function.blocks.len() as u32)
            .map(BlockId)
            .map(|b| (b, chase(b, &function.blocks)))
            .collect();
        for block in &mut function.blocks {
            if let Some(term) = block.terminator.as_mut() {
                term.retarget(|b| forward[&b]);
            }
        }

        // Reachability from entry over the redirected edges
        let mut reachable: FxHashSet<BlockId> = FxHashSet::default();
        let mut stack = vec![BlockId::ENTRY];
        while let Some(block_id) = stack.pop() {
            if !reachable.insert(block_id) {
                continue;
            }
            if let Some(term) = &function.blocks[block_id.index()].terminator {
                for target in term.targets() {
                    if !reachable.contains(&target) {
                        stack.push(target);
                    }
                }
            }
        }

        if reachable.len() == function.blocks.len() {
            return Ok(function);
        }

        // Compact surviving blocks, preserving order
        let mut remap: FxHashMap<BlockId, BlockId> = FxHashMap::default();
        let mut kept: Vec<RawBlock> = Vec::with_capacity(reachable.len());
        for (old_idx, block) in function.blocks.into_iter().enumerate() {
            let old_id = BlockId(old_idx as u32);
            if reachable.contains(&old_id) {
                remap.insert(old_id, BlockId(kept.len() as u32));
                kept.push(block);
            }
        }
        for block in &mut kept {
            if let Some(term) = block.terminator.as_mut() {
                term.retarget(|b| remap[&b]);
            }
        }
        function.blocks = kept;
        Ok(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir::domain::{FunctionBuilder, IrType, Literal};

    fn cx() -> PassContext<'static> {
        PassContext::new("m", "f")
    }

    #[test]
    fn test_unreachable_blocks_dropped() {
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        let dead = fb.add_block();
        let a = fb.literal(Literal::Int(1), IrType::new("Int"));
        fb.ret(Some(a));
        fb.switch_to(dead);
        fb.unreachable();

        let simplified = SimplifyCfg.run(fb.finish(), &cx()).unwrap();
        assert_eq!(simplified.blocks.len(), 1);
    }

    #[test]
    fn test_forwarding_block_bypassed() {
        // entry -> hop -> exit, where hop is empty
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        let hop = fb.add_block();
        let exit = fb.add_block();
        fb.branch(hop, vec![]);
        fb.switch_to(hop);
        fb.branch(exit, vec![]);
        fb.switch_to(exit);
        fb.ret(None);

        let simplified = SimplifyCfg.run(fb.finish(), &cx()).unwrap();
        // entry + exit survive; hop is bypassed and unreachable
        assert_eq!(simplified.blocks.len(), 2);
        let entry_term = simplified.blocks[0].terminator.as_ref().unwrap();
        assert_eq!(entry_term.targets(), vec![BlockId(1)]);
    }

    #[test]
    fn test_forwarding_cycle_kept() {
        // entry -> spin, spin -> spin: an intentional infinite loop
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        let spin = fb.add_block();
        fb.branch(spin, vec![]);
        fb.switch_to(spin);
        fb.branch(spin, vec![]);

        let simplified = SimplifyCfg.run(fb.finish(), &cx()).unwrap();
        assert_eq!(simplified.blocks.len(), 2);
    }

    #[test]
    fn test_idempotent_on_simplified_input() {
        let mut fb = FunctionBuilder::new("f", IrType::new("Int"));
        let dead = fb.add_block();
        let a = fb.literal(Literal::Int(1), IrType::new("Int"));
        fb.ret(Some(a));
        fb.switch_to(dead);
        fb.unreachable();

        let once = SimplifyCfg.run(fb.finish(), &cx()).unwrap();
        let twice = SimplifyCfg.run(once.clone(), &cx()).unwrap();
        assert_eq!(once, twice);
    }
}
