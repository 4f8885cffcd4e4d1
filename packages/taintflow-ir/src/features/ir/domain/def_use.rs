//! Def-use index over a canonical function
//!
//! The taint engines propagate sparsely along SSA edges, so each function's
//! def sites and use sites are indexed once and then shared (the engine keeps
//! these behind an LRU cache keyed by function).

use rustc_hash::FxHashMap;

use super::block::BlockId;
use super::function::CanonicalFunction;
use super::value::ValueId;

/// Position of an instruction within a function.
///
/// `index == instructions.len()` designates the block's terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstRef {
    pub block: BlockId,
    pub index: u32,
}

impl InstRef {
    pub fn new(block: BlockId, index: u32) -> Self {
        Self { block, index }
    }
}

/// Where a value is defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefSite {
    /// Block parameter `index` of `block`; entry-block parameters are the
    /// function parameters
    BlockParam { block: BlockId, index: u32 },
    /// Result of an instruction
    Inst(InstRef),
}

/// Def and use sites of every value in one canonical function
#[derive(Debug, Clone, Default)]
pub struct DefUseIndex {
    defs: FxHashMap<ValueId, DefSite>,
    uses: FxHashMap<ValueId, Vec<InstRef>>,
    /// Branch sites passing arguments into each block, for use-def walks
    /// across block-parameter bindings
    branch_sites_into: FxHashMap<BlockId, Vec<InstRef>>,
    /// Return terminator sites
    returns: Vec<InstRef>,
}

impl DefUseIndex {
    pub fn build(function: &CanonicalFunction) -> Self {
        let mut index = DefUseIndex::default();

        for (block_idx, block) in function.blocks.iter().enumerate() {
            let block_id = BlockId(block_idx as u32);

            for (param_idx, param) in block.params.iter().enumerate() {
                index.defs.insert(
                    param.value,
                    DefSite::BlockParam {
                        block: block_id,
                        index: param_idx as u32,
                    },
                );
            }

            for (inst_idx, inst) in block.instructions.iter().enumerate() {
                let site = InstRef::new(block_id, inst_idx as u32);
                if let Some(result) = inst.op.result() {
                    index.defs.insert(result.value, DefSite::Inst(site));
                }
                for operand in inst.op.operands() {
                    index.uses.entry(operand).or_default().push(site);
                }
            }

            let term_site = InstRef::new(block_id, block.instructions.len() as u32);
            for operand in block.terminator.operands() {
                index.uses.entry(operand).or_default().push(term_site);
            }
            for (target, _) in block.terminator.edge_args() {
                index
                    .branch_sites_into
                    .entry(target)
                    .or_default()
                    .push(term_site);
            }
            if matches!(
                block.terminator,
                super::instruction::CanonicalTerminator::Return { .. }
            ) {
                index.returns.push(term_site);
            }
        }

        index
    }

    pub fn def_of(&self, value: ValueId) -> Option<DefSite> {
        self.defs.get(&value).copied()
    }

    pub fn uses_of(&self, value: ValueId) -> &[InstRef] {
        self.uses.get(&value).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Terminator sites that branch into `block` (passing its parameters)
    pub fn branch_sites_into(&self, block: BlockId) -> &[InstRef] {
        self.branch_sites_into
            .get(&block)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All return terminator sites in the function
    pub fn returns(&self) -> &[InstRef] {
        &self.returns
    }
}
