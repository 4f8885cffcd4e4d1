//! Feature modules (pipeline stages)
//!
//! Data flows one way through the features:
//! raw module -> canonical module -> module group -> call graph -> taint results.

pub mod call_graph;
pub mod canonicalizer;
pub mod ir;
pub mod linker;
pub mod taint;
