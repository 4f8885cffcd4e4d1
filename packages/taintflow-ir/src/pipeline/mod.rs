//! Pipeline orchestration
//!
//! Drives raw modules end to end: canonicalize -> group -> call graph ->
//! analyze. A module that fails canonicalization is reported and excluded;
//! it never aborts the rest of the run. Registered observers see every
//! intermediate artifact, for diagnostics only.

pub mod observer;
pub mod orchestrator;
pub mod result;

pub use observer::PipelineObserver;
pub use orchestrator::Orchestrator;
pub use result::{FailedModule, PipelineResult};
