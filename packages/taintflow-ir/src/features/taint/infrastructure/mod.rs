//! Propagation engines

mod backward;
mod def_use_cache;
mod engine;
mod fact_store;
mod forward;

pub(crate) use backward::propagate_backward;
pub(crate) use def_use_cache::DefUseCache;
pub(crate) use fact_store::{FactStore, PropagationOutcome};
pub(crate) use engine::{backward_seeds, forward_seeds, validate_graph, EngineContext, Seed};
pub(crate) use forward::propagate_forward;

pub use engine::RunState;
