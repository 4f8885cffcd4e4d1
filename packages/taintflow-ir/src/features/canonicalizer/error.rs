//! Canonicalization failures
//!
//! Every variant identifies the offending module, function, and position so
//! a driver can report it without re-deriving context. A failed module is
//! excluded from grouping; it never aborts the rest of a pipeline run.

use thiserror::Error;

use crate::features::ir::domain::{BlockId, ValueId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    #[error("in `{module}`, function `{function}`: operand {value} at {block}[{index}] references no definition")]
    UndefinedValue {
        module: String,
        function: String,
        block: BlockId,
        index: u32,
        value: ValueId,
    },

    #[error("in `{module}`, function `{function}`: value {value} is defined more than once")]
    DuplicateDefinition {
        module: String,
        function: String,
        value: ValueId,
    },

    #[error("in `{module}`, function `{function}`: {block} has no terminator")]
    MissingTerminator {
        module: String,
        function: String,
        block: BlockId,
    },

    #[error("in `{module}`, function `{function}`: {block} targets out-of-range {target}")]
    InvalidBlockTarget {
        module: String,
        function: String,
        block: BlockId,
        target: BlockId,
    },

    #[error("in `{module}`, function `{function}`: edge {block} -> {target} passes {passed} args, {target} expects {expected}")]
    BlockArgMismatch {
        module: String,
        function: String,
        block: BlockId,
        target: BlockId,
        passed: usize,
        expected: usize,
    },

    #[error("in `{module}`, function `{function}`: unsupported instruction `{name}` at {block}[{index}]")]
    UnsupportedInstruction {
        module: String,
        function: String,
        block: BlockId,
        index: u32,
        name: String,
    },

    #[error("in `{module}`, function `{function}`: function has no blocks")]
    EmptyFunction { module: String, function: String },
}

impl CanonicalizationError {
    /// Qualified symbol of the function that failed
    pub fn function(&self) -> &str {
        match self {
            CanonicalizationError::UndefinedValue { function, .. }
            | CanonicalizationError::DuplicateDefinition { function, .. }
            | CanonicalizationError::MissingTerminator { function, .. }
            | CanonicalizationError::InvalidBlockTarget { function, .. }
            | CanonicalizationError::BlockArgMismatch { function, .. }
            | CanonicalizationError::UnsupportedInstruction { function, .. }
            | CanonicalizationError::EmptyFunction { function, .. } => function,
        }
    }

    /// Name of the module that failed
    pub fn module(&self) -> &str {
        match self {
            CanonicalizationError::UndefinedValue { module, .. }
            | CanonicalizationError::DuplicateDefinition { module, .. }
            | CanonicalizationError::MissingTerminator { module, .. }
            | CanonicalizationError::InvalidBlockTarget { module, .. }
            | CanonicalizationError::BlockArgMismatch { module, .. }
            | CanonicalizationError::UnsupportedInstruction { module, .. }
            | CanonicalizationError::EmptyFunction { module, .. } => module,
        }
    }
}
