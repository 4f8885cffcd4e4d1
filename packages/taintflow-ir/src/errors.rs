//! Error types for taintflow-ir
//!
//! Each pipeline stage defines its own error in its feature module; this is
//! the crate-wide aggregation drivers match on. The taxonomy is deliberate:
//! canonicalization failures are fatal per module, link failures per
//! grouping attempt, analysis failures per run, and nothing here is fatal
//! to the process.

use thiserror::Error;

pub use crate::features::canonicalizer::error::CanonicalizationError;
pub use crate::features::linker::error::LinkError;
pub use crate::features::taint::domain::SpecificationError;
pub use crate::features::taint::error::AnalysisError;

/// Main error type for taintflow-ir operations
#[derive(Debug, Error)]
pub enum TaintflowError {
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Specification(#[from] SpecificationError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for taintflow operations
pub type Result<T> = std::result::Result<T, TaintflowError>;
