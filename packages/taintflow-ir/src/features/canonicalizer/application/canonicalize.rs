//! Module-level canonicalization
//!
//! Functions canonicalize independently, so the module maps over them in
//! parallel. The whole module succeeds or fails: the first failing function
//! in declaration order wins, regardless of which worker hit it first, so a
//! failing module reports the same error on every run.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::features::canonicalizer::domain::{PassContext, RawPass};
use crate::features::canonicalizer::error::CanonicalizationError;
use crate::features::canonicalizer::infrastructure::{
    finalize, LowerOperators, SimplifyCfg, VerifyStructure,
};
use crate::features::ir::domain::{CanonicalFunction, CanonicalModule, RawFunction, RawModule};

/// Run the full pass pipeline over one function
pub fn canonicalize_function(
    module: &str,
    function: RawFunction,
) -> Result<CanonicalFunction, CanonicalizationError> {
    let symbol = function.symbol.clone();
    let cx = PassContext::new(module, &symbol);

    let function = VerifyStructure.run(function, &cx)?;
    let function = SimplifyCfg.run(function, &cx)?;
    let function = LowerOperators.run(function, &cx)?;
    finalize(function, &cx)
}

/// Canonicalize one raw module into its canonical form
///
/// All-or-nothing: either every function canonicalizes or the module fails
/// with the error of its first offending function.
pub fn canonicalize(module: &RawModule) -> Result<CanonicalModule, CanonicalizationError> {
    debug!(
        module = %module.name,
        functions = module.functions.len(),
        "canonicalizing module"
    );

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<CanonicalFunction, CanonicalizationError>> = module
        .functions
        .par_iter()
        .map(|f| canonicalize_function(&module.name, f.clone()))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Result<CanonicalFunction, CanonicalizationError>> = module
        .functions
        .iter()
        .map(|f| canonicalize_function(&module.name, f.clone()))
        .collect();

    let mut functions = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        functions.push(outcome?);
    }

    debug!(module = %module.name, "module canonicalized");
    Ok(CanonicalModule {
        name: module.name.clone(),
        functions,
    })
}
