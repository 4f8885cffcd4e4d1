//! Linker domain types

mod model_cache;
mod module_group;

pub use model_cache::ModelModuleCache;
pub use module_group::{FunctionId, LinkedFunction, ModuleGroup};
