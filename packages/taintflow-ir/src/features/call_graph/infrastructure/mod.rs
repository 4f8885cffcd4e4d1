//! Call graph construction

mod builder;

pub use builder::build_call_graph;
