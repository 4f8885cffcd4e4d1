//! Function declarations
//!
//! A function owns its qualified symbol (the demangled, typed signature
//! string used for specification matching), its blocks, and metadata. It
//! belongs to exactly one module.

use serde::{Deserialize, Serialize};

use super::block::{BlockId, CanonicalBlock, RawBlock};
use super::value::{IrType, ValueDef};
use crate::shared::models::Loc;

/// Function metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FunctionAttributes {
    /// Stub standing in for library/runtime code not present in user source
    pub is_model_stub: bool,
    /// Declaration site in the original source, when known
    pub loc: Option<Loc>,
}

/// Raw function, as translated 1:1 from the low-level SSA input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFunction {
    pub symbol: String,
    pub return_type: IrType,
    pub blocks: Vec<RawBlock>,
    pub attributes: FunctionAttributes,
}

impl RawFunction {
    /// Function parameters are the entry block's parameters
    pub fn params(&self) -> &[ValueDef] {
        self.blocks
            .first()
            .map(|b| b.params.as_slice())
            .unwrap_or(&[])
    }
}

/// Canonical function: verified, lowered, densely numbered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFunction {
    pub symbol: String,
    pub return_type: IrType,
    pub blocks: Vec<CanonicalBlock>,
    pub attributes: FunctionAttributes,
    /// Qualified symbols of every direct call and function reference,
    /// sorted and deduplicated; the linker audits these
    pub called_symbols: Vec<String>,
    /// One past the highest value id, after dense renumbering
    pub value_count: u32,
}

impl CanonicalFunction {
    /// Function parameters are the entry block's parameters
    pub fn params(&self) -> &[ValueDef] {
        self.blocks
            .first()
            .map(|b| b.params.as_slice())
            .unwrap_or(&[])
    }

    pub fn entry_block(&self) -> &CanonicalBlock {
        &self.blocks[BlockId::ENTRY.index()]
    }

    pub fn block(&self, id: BlockId) -> Option<&CanonicalBlock> {
        self.blocks.get(id.index())
    }

    /// Instruction at a (block, index) position; `None` for terminator
    /// positions and out-of-range references
    pub fn instruction_at(
        &self,
        block: BlockId,
        index: u32,
    ) -> Option<&super::instruction::CanonicalInstruction> {
        self.block(block)?.instructions.get(index as usize)
    }
}
