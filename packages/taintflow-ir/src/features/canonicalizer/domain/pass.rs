//! Pass trait and ordering
//!
//! Passes consume and return whole functions; nothing is mutated in place
//! across pass boundaries, which is what makes per-function canonicalization
//! trivially parallel.

use crate::features::canonicalizer::error::CanonicalizationError;
use crate::features::ir::domain::{BlockId, RawFunction, ValueId};

/// The documented pass order. The finalize step (renumber + convert) always
/// runs last and is not a [`RawPass`]; it changes the output type.
pub const PASS_ORDER: &[&str] = &["verify-structure", "simplify-cfg", "lower-operators"];

/// A raw-to-raw transformation pass over one function
pub trait RawPass {
    fn name(&self) -> &'static str;

    fn run(
        &self,
        function: RawFunction,
        cx: &PassContext<'_>,
    ) -> Result<RawFunction, CanonicalizationError>;
}

/// Identity of the function being canonicalized, for error construction
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub module: &'a str,
    pub function: &'a str,
}

impl<'a> PassContext<'a> {
    pub fn new(module: &'a str, function: &'a str) -> Self {
        Self { module, function }
    }

    pub fn undefined_value(&self, block: BlockId, index: u32, value: ValueId) -> CanonicalizationError {
        CanonicalizationError::UndefinedValue {
            module: self.module.to_string(),
            function: self.function.to_string(),
            block,
            index,
            value,
        }
    }

    pub fn duplicate_definition(&self, value: ValueId) -> CanonicalizationError {
        CanonicalizationError::DuplicateDefinition {
            module: self.module.to_string(),
            function: self.function.to_string(),
            value,
        }
    }

    pub fn missing_terminator(&self, block: BlockId) -> CanonicalizationError {
        CanonicalizationError::MissingTerminator {
            module: self.module.to_string(),
            function: self.function.to_string(),
            block,
        }
    }

    pub fn block_arg_mismatch(
        &self,
        block: BlockId,
        target: BlockId,
        passed: usize,
        expected: usize,
    ) -> CanonicalizationError {
        CanonicalizationError::BlockArgMismatch {
            module: self.module.to_string(),
            function: self.function.to_string(),
            block,
            target,
            passed,
            expected,
        }
    }

    pub fn invalid_block_target(&self, block: BlockId, target: BlockId) -> CanonicalizationError {
        CanonicalizationError::InvalidBlockTarget {
            module: self.module.to_string(),
            function: self.function.to_string(),
            block,
            target,
        }
    }

    pub fn unsupported_instruction(
        &self,
        block: BlockId,
        index: u32,
        name: &str,
    ) -> CanonicalizationError {
        CanonicalizationError::UnsupportedInstruction {
            module: self.module.to_string(),
            function: self.function.to_string(),
            block,
            index,
            name: name.to_string(),
        }
    }

    pub fn empty_function(&self) -> CanonicalizationError {
        CanonicalizationError::EmptyFunction {
            module: self.module.to_string(),
            function: self.function.to_string(),
        }
    }
}
