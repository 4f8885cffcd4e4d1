//! Linking failures

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Two non-model modules define the same qualified symbol. Model
    /// shadowing is not an error; genuine duplicates are.
    #[error("duplicate definition of `{symbol}` in modules `{first}` and `{second}`")]
    DuplicateSymbol {
        symbol: String,
        first: String,
        second: String,
    },

    /// A model stub references a symbol no module in the group defines.
    /// Model modules are curated stand-ins and must be closed over the
    /// group; user-code references degrade to unresolved instead.
    #[error("model module `{module}` references `{symbol}`, which no module in the group defines")]
    DanglingModelReference { module: String, symbol: String },
}
