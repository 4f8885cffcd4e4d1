//! Basic blocks
//!
//! Blocks carry SSA block parameters instead of phi instructions: a branch
//! passes arguments, the target block binds them. Block 0 of every function
//! is its entry, and the entry block's parameters are the function parameters.

use serde::{Deserialize, Serialize};

use super::instruction::{CanonicalInstruction, CanonicalTerminator, RawInstruction, RawTerminator};
use super::value::ValueDef;

/// Block identifier, an index into the owning function's block list
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct BlockId(pub u32);

impl BlockId {
    pub const ENTRY: BlockId = BlockId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Raw block: terminator may be missing, which canonicalization rejects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub params: Vec<ValueDef>,
    pub instructions: Vec<RawInstruction>,
    pub terminator: Option<RawTerminator>,
}

impl RawBlock {
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            instructions: Vec::new(),
            terminator: None,
        }
    }
}

impl Default for RawBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical block: exactly one terminator, structurally verified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBlock {
    pub params: Vec<ValueDef>,
    pub instructions: Vec<CanonicalInstruction>,
    pub terminator: CanonicalTerminator,
}
