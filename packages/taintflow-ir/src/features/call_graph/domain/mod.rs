//! Call graph domain types

mod graph;

pub use graph::{CallGraph, CallSiteRef, CallTarget};
