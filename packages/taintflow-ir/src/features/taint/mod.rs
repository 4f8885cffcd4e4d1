//! Taint-flow analysis
//!
//! A demand-driven, worklist-based interprocedural dataflow analysis over
//! the linked module group and its call graph. Forward mode chases facts
//! from source call sites toward sinks along def-use edges; backward mode
//! mirrors it from sink operands toward sources along use-def edges. Both
//! report the same finding shape: (source site, sink site, witness path).
//!
//! Context sensitivity is summary-based: facts merge per function, never
//! per call string, which bounds the fact lattice and guarantees
//! termination on recursive call graphs.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::{analyze, analyze_with_options, TaintAnalysis};
pub use domain::{
    AbstractLoc, CallSiteClass, Finding, Specification, SpecificationError, TaintAnalysisResults,
    TaintFact,
};
pub use error::AnalysisError;
pub use infrastructure::RunState;
