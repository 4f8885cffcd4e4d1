//! Canonicalization passes

mod finalize;
mod lower_operators;
mod simplify_cfg;
mod verify;

pub use finalize::finalize;
pub use lower_operators::LowerOperators;
pub use simplify_cfg::SimplifyCfg;
pub use verify::VerifyStructure;
