//! Pipeline observers
//!
//! A plain observer interface in place of required callback imports:
//! subscribers are invoked with each intermediate artifact, purely for
//! external diagnostics (printing, dumping, metrics). Observers cannot
//! return anything and must not affect analysis results.

use crate::features::call_graph::domain::CallGraph;
use crate::features::ir::domain::{CanonicalModule, RawModule};
use crate::features::linker::domain::ModuleGroup;
use crate::features::taint::domain::TaintAnalysisResults;

/// Subscriber to pipeline artifacts. Every hook has a no-op default, so an
/// observer implements only what it cares about.
pub trait PipelineObserver: Send + Sync {
    fn on_raw_module(&self, _module: &RawModule) {}

    fn on_canonical_module(&self, _module: &CanonicalModule) {}

    fn on_module_group(&self, _group: &ModuleGroup) {}

    fn on_call_graph(&self, _graph: &CallGraph) {}

    fn on_results(&self, _results: &TaintAnalysisResults) {}
}
