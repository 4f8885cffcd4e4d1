//! Module grouper / linker
//!
//! Merges canonical user modules plus model (library stub) modules into one
//! linked, analysis-ready [`domain::ModuleGroup`] with a global symbol
//! table. Resolution follows module order; model modules only fill gaps and
//! never override user definitions. Symbols nobody defines stay in the group
//! as explicit unresolved entries, and the analysis treats calls to them as
//! conservative black boxes instead of failing.

pub mod application;
pub mod domain;
pub mod error;

pub use application::{group, group_with_inspectors, ModuleInspector};
pub use domain::{FunctionId, LinkedFunction, ModelModuleCache, ModuleGroup};
pub use error::LinkError;
