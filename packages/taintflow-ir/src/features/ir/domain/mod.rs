//! IR domain types

mod block;
mod builder;
mod def_use;
mod function;
mod instruction;
mod module;
mod value;

pub use block::{BlockId, CanonicalBlock, RawBlock};
pub use builder::{FunctionBuilder, ModuleBuilder};
pub use def_use::{DefSite, DefUseIndex, InstRef};
pub use function::{CanonicalFunction, FunctionAttributes, RawFunction};
pub use instruction::{
    CanonicalInstruction, CanonicalOperator, CanonicalTerminator, RawInstruction, RawOperator,
    RawTerminator,
};
pub use module::{CanonicalModule, RawModule};
pub use value::{BinOp, IrType, Literal, UnaryOp, ValueDef, ValueId};
