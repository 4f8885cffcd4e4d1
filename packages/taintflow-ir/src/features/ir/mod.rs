//! Instruction/value model
//!
//! Defines the typed values, operators, and control-flow-graph instructions
//! of both IR forms. Everything downstream is built on these types.
//!
//! Two distinct module types exist on purpose:
//! - [`domain::RawModule`]: the direct, non-normalized translation of the
//!   low-level SSA input. May contain unsupported instructions, unreachable
//!   blocks, missing terminators, and sparse value numbering.
//! - [`domain::CanonicalModule`]: the normalized form produced by the
//!   canonicalizer and consumed by linking and analysis. Structurally
//!   verified, densely numbered, closed operator set.
//!
//! Conversion is one-way; a canonical module can be re-embedded into raw
//! form (every canonical function is a valid raw function), which is what
//! the idempotence tests exercise.

pub mod domain;

pub use domain::{
    BinOp, BlockId, CanonicalBlock, CanonicalFunction, CanonicalInstruction, CanonicalModule,
    CanonicalOperator, CanonicalTerminator, DefSite, DefUseIndex, FunctionAttributes,
    FunctionBuilder, InstRef, IrType, Literal, ModuleBuilder, RawBlock, RawFunction,
    RawInstruction, RawModule, RawOperator, RawTerminator, UnaryOp, ValueDef, ValueId,
};
