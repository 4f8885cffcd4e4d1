//! Analysis failures
//!
//! Reached only on internal invariant violations. Budget exhaustion and
//! unresolvable callees are not errors; they mark the results incomplete.

use thiserror::Error;

use crate::features::call_graph::domain::CallSiteRef;
use crate::features::linker::domain::FunctionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("call graph references {0}, which is not in the module group")]
    UnknownFunction(FunctionId),

    #[error("call site {site} does not address a call instruction")]
    MalformedCallSite { site: CallSiteRef },
}
