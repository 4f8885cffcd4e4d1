//! Grouping entry points

mod group;

pub use group::{group, group_with_inspectors, ModuleInspector};
