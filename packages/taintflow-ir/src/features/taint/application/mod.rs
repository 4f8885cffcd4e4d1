//! Analysis entry points

mod analyze;

pub use analyze::{analyze, analyze_with_options, TaintAnalysis};
