//! End-to-end driver
//!
//! The embedding a front end talks to: hand it raw modules, model modules,
//! and a specification; get results. Canonicalization failures exclude only
//! the failing module (reported in the result); link failures are fatal for
//! the grouping attempt and surface as errors.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AnalysisOptions;
use crate::errors::TaintflowError;
use crate::features::call_graph::infrastructure::build_call_graph;
use crate::features::canonicalizer::application::canonicalize;
use crate::features::ir::domain::{CanonicalModule, RawModule};
use crate::features::linker::application::group;
use crate::features::taint::application::analyze_with_options;
use crate::features::taint::domain::Specification;
use crate::pipeline::observer::PipelineObserver;
use crate::pipeline::result::{FailedModule, PipelineResult};

pub struct Orchestrator {
    options: AnalysisOptions,
    observers: Vec<Box<dyn PipelineObserver>>,
}

impl Orchestrator {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            observers: Vec::new(),
        }
    }

    /// Register a diagnostics observer; observers see artifacts in
    /// registration order
    pub fn add_observer(&mut self, observer: Box<dyn PipelineObserver>) -> &mut Self {
        self.observers.push(observer);
        self
    }

    /// Run the full pipeline over raw user modules plus model modules
    pub fn run(
        &self,
        raw_modules: Vec<RawModule>,
        model_modules: Vec<Arc<CanonicalModule>>,
        spec: &Specification,
    ) -> Result<PipelineResult, TaintflowError> {
        info!(
            modules = raw_modules.len(),
            models = model_modules.len(),
            specification = %spec.name,
            "pipeline started"
        );

        let mut canonical_modules = Vec::with_capacity(raw_modules.len());
        let mut failed_modules = Vec::new();
        for raw in &raw_modules {
            for observer in &self.observers {
                observer.on_raw_module(raw);
            }
            match canonicalize(raw) {
                Ok(canonical) => {
                    for observer in &self.observers {
                        observer.on_canonical_module(&canonical);
                    }
                    canonical_modules.push(canonical);
                }
                Err(error) => {
                    warn!(module = %raw.name, %error, "module excluded");
                    failed_modules.push(FailedModule {
                        module: raw.name.clone(),
                        error,
                    });
                }
            }
        }

        let module_group = group(canonical_modules, model_modules)?;
        for observer in &self.observers {
            observer.on_module_group(&module_group);
        }

        let call_graph = build_call_graph(&module_group);
        for observer in &self.observers {
            observer.on_call_graph(&call_graph);
        }

        let results =
            analyze_with_options(&module_group, &call_graph, spec, self.options.clone())?;
        for observer in &self.observers {
            observer.on_results(&results);
        }

        info!(
            findings = results.len(),
            excluded = failed_modules.len(),
            "pipeline completed"
        );
        Ok(PipelineResult {
            results,
            failed_modules,
            module_count: module_group.module_names().len(),
            function_count: module_group.len(),
        })
    }
}
