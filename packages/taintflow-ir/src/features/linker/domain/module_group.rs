//! The linked program image
//!
//! Functions live in a flat arena indexed by [`FunctionId`]; every
//! cross-function edge downstream (symbol table, call graph, taint
//! provenance) is an integer index into it. The group is built once per
//! analysis run and immutable afterwards.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::features::ir::domain::CanonicalFunction;

/// Index of a function within a [`ModuleGroup`]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FunctionId(pub u32);

impl FunctionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FunctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// One function in the linked image, with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedFunction {
    /// Module the definition was taken from
    pub module: String,
    /// Definition came from a model module or is itself a model stub
    pub is_model: bool,
    pub body: CanonicalFunction,
}

impl LinkedFunction {
    pub fn symbol(&self) -> &str {
        &self.body.symbol
    }
}

/// The linked union of user and model modules
#[derive(Debug, Clone, Default)]
pub struct ModuleGroup {
    functions: Vec<LinkedFunction>,
    symbols: FxHashMap<String, FunctionId>,
    unresolved: FxHashSet<String>,
    module_names: Vec<String>,
}

impl ModuleGroup {
    pub(crate) fn push(&mut self, function: LinkedFunction) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.symbols.insert(function.symbol().to_string(), id);
        self.functions.push(function);
        id
    }

    pub(crate) fn record_module(&mut self, name: &str) {
        self.module_names.push(name.to_string());
    }

    pub(crate) fn record_unresolved(&mut self, symbol: &str) {
        self.unresolved.insert(symbol.to_string());
    }

    /// Look a function up by arena index
    pub fn get(&self, id: FunctionId) -> Option<&LinkedFunction> {
        self.functions.get(id.index())
    }

    /// Resolve a qualified symbol to its defining function
    pub fn resolve(&self, symbol: &str) -> Option<FunctionId> {
        self.symbols.get(symbol).copied()
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    /// Symbols referenced somewhere in the group but defined nowhere
    pub fn unresolved_symbols(&self) -> &FxHashSet<String> {
        &self.unresolved
    }

    pub fn is_unresolved(&self, symbol: &str) -> bool {
        self.unresolved.contains(symbol)
    }

    pub fn functions(&self) -> &[LinkedFunction] {
        &self.functions
    }

    pub fn function_ids(&self) -> impl Iterator<Item = FunctionId> + '_ {
        (0..self.functions.len() as u32).map(FunctionId)
    }

    /// Model-stub functions, the candidate pool for indirect-call matching
    pub fn model_stub_ids(&self) -> impl Iterator<Item = FunctionId> + '_ {
        self.function_ids()
            .filter(|id| self.functions[id.index()].is_model)
    }

    pub fn module_names(&self) -> &[String] {
        &self.module_names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
