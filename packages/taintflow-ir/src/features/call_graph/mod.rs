//! Call graph builder
//!
//! Derives a best-effort call graph from a linked module group. Direct
//! calls resolve exactly through the symbol table. Indirect (apply) calls
//! resolve by chasing the callee operand back to a function reference when
//! the chain is visible, falling back to arity-matched model stubs, and
//! finally to a synthetic modeled-unknown node. Construction never fails;
//! the graph is an over-approximation whose quality is a tested property,
//! not a runtime error.

pub mod domain;
pub mod infrastructure;

pub use domain::{CallGraph, CallSiteRef, CallTarget};
pub use infrastructure::build_call_graph;
