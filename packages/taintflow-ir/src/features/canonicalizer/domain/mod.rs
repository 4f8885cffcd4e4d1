//! Pass framework

mod pass;

pub use pass::{PassContext, RawPass, PASS_ORDER};
