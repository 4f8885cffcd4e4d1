/*
 * taintflow-ir - Static Taint Analysis over a Canonical SSA IR
 *
 * Feature-First Architecture:
 * - shared/      : Common models (Loc, constants)
 * - features/    : Vertical slices (ir -> canonicalizer -> linker ->
 *                  call_graph -> taint)
 * - pipeline/    : Orchestration and observers
 *
 * Programs arrive from a low-level SSA front end as raw modules, are
 * normalized by a fixed pass pipeline, linked together with library model
 * modules, and analyzed by demand-driven forward/backward taint
 * propagation over the derived call graph.
 */

// Crate-level lint configuration
#![allow(dead_code)] // Query helpers kept for embedding drivers
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::upper_case_acronyms)] // IR, SSA naming
#![allow(clippy::too_many_arguments)] // Transfer functions carry context

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and constants
pub mod shared;

/// Feature modules (pipeline stages)
pub mod features;

/// Pipeline orchestration
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{AnalysisOptions, Direction};
pub use errors::{
    AnalysisError, CanonicalizationError, LinkError, Result, SpecificationError, TaintflowError,
};

pub use features::ir::{
    BinOp, BlockId, CanonicalFunction, CanonicalModule, FunctionBuilder, IrType, Literal,
    ModuleBuilder, RawFunction, RawModule, UnaryOp, ValueId,
};

pub use features::canonicalizer::canonicalize;
pub use features::linker::{group, FunctionId, ModelModuleCache, ModuleGroup};

pub use features::call_graph::{build_call_graph, CallGraph, CallSiteRef, CallTarget};

pub use features::taint::{
    analyze, analyze_with_options, Finding, RunState, Specification, TaintAnalysis,
    TaintAnalysisResults,
};

pub use pipeline::{Orchestrator, PipelineObserver, PipelineResult};

pub use shared::models::Loc;
