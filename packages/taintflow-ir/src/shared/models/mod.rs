//! Shared models

mod loc;

pub use loc::Loc;
