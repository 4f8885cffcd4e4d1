//! Taint facts
//!
//! A fact is "this location holds data derived from the seed of the current
//! propagation". Facts live only while a propagation runs; the seed's
//! originating call site is carried by the propagation itself, not by each
//! fact, since every propagation serves exactly one seed.

use crate::features::ir::domain::ValueId;
use crate::features::linker::domain::FunctionId;

/// What can be tainted inside one function
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbstractLoc {
    /// An SSA value
    Value(ValueId),
    /// A field-like cell reached from a base value; the minimal heap model
    /// needed to carry taint through field writes and reads
    Field { base: ValueId, field: String },
}

/// One live fact: a tainted location within a function
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaintFact {
    pub function: FunctionId,
    pub loc: AbstractLoc,
}

impl TaintFact {
    pub fn value(function: FunctionId, value: ValueId) -> Self {
        Self {
            function,
            loc: AbstractLoc::Value(value),
        }
    }

    pub fn field(function: FunctionId, base: ValueId, field: impl Into<String>) -> Self {
        Self {
            function,
            loc: AbstractLoc::Field {
                base,
                field: field.into(),
            },
        }
    }
}
