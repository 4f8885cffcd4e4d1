//! The grouping algorithm
//!
//! Order matters twice: user modules link in the order given (first
//! definition of a symbol wins only against later *model* definitions;
//! between user modules a duplicate is an error), and model modules link
//! after all user modules so they can only fill gaps.

use std::sync::Arc;

use tracing::{debug, info};

use crate::features::ir::domain::CanonicalModule;
use crate::features::linker::domain::{LinkedFunction, ModuleGroup};
use crate::features::linker::error::LinkError;

/// Diagnostic hook invoked with each module as it links; must not affect
/// the resulting group
pub type ModuleInspector<'a> = &'a dyn Fn(&CanonicalModule);

/// Link user modules and model modules into one group
pub fn group(
    user_modules: Vec<CanonicalModule>,
    model_modules: Vec<Arc<CanonicalModule>>,
) -> Result<ModuleGroup, LinkError> {
    group_with_inspectors(user_modules, model_modules, None, None)
}

/// Link with optional diagnostic inspection hooks: one invoked per user
/// module, one per model module
pub fn group_with_inspectors(
    user_modules: Vec<CanonicalModule>,
    model_modules: Vec<Arc<CanonicalModule>>,
    user_inspector: Option<ModuleInspector<'_>>,
    model_inspector: Option<ModuleInspector<'_>>,
) -> Result<ModuleGroup, LinkError> {
    let mut group = ModuleGroup::default();

    for module in &user_modules {
        if let Some(inspect) = user_inspector {
            inspect(module);
        }
        group.record_module(&module.name);
        for function in &module.functions {
            if let Some(existing) = group.resolve(&function.symbol) {
                let first = group
                    .get(existing)
                    .map(|f| f.module.clone())
                    .unwrap_or_default();
                return Err(LinkError::DuplicateSymbol {
                    symbol: function.symbol.clone(),
                    first,
                    second: module.name.clone(),
                });
            }
            group.push(LinkedFunction {
                module: module.name.clone(),
                is_model: function.attributes.is_model_stub,
                body: function.clone(),
            });
        }
        debug!(module = %module.name, "user module linked");
    }

    for module in &model_modules {
        if let Some(inspect) = model_inspector {
            inspect(module);
        }
        group.record_module(&module.name);
        for function in &module.functions {
            // Fill gaps only; user definitions and earlier models win
            if group.contains_symbol(&function.symbol) {
                continue;
            }
            group.push(LinkedFunction {
                module: module.name.clone(),
                is_model: true,
                body: function.clone(),
            });
        }
        debug!(module = %module.name, "model module linked");
    }

    audit_references(&mut group)?;

    info!(
        modules = group.module_names().len(),
        functions = group.len(),
        unresolved = group.unresolved_symbols().len(),
        "module group linked"
    );
    Ok(group)
}

/// Check every referenced call symbol. Model references must close over the
/// group; user references degrade to explicit unresolved entries.
fn audit_references(group: &mut ModuleGroup) -> Result<(), LinkError> {
    let mut dangling: Vec<(bool, String, String)> = Vec::new();
    for function in group.functions() {
        for symbol in &function.body.called_symbols {
            if !group.contains_symbol(symbol) {
                dangling.push((function.is_model, function.module.clone(), symbol.clone()));
            }
        }
    }
    for (is_model, module, symbol) in dangling {
        if is_model {
            return Err(LinkError::DanglingModelReference { module, symbol });
        }
        group.record_unresolved(&symbol);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::canonicalizer::canonicalize;
    use crate::features::ir::domain::{FunctionBuilder, IrType, ModuleBuilder, RawModule};

    fn canonical(module: RawModule) -> CanonicalModule {
        canonicalize(&module).unwrap()
    }

    fn module_with(name: &str, symbols: &[&str]) -> CanonicalModule {
        let mut mb = ModuleBuilder::new(name);
        for symbol in symbols {
            let mut fb = FunctionBuilder::new(*symbol, IrType::new("Int"));
            fb.ret(None);
            mb.add_function(fb.finish());
        }
        canonical(mb.finish())
    }

    fn model_with(name: &str, symbols: &[&str]) -> Arc<CanonicalModule> {
        let mut mb = ModuleBuilder::new(name);
        for symbol in symbols {
            let mut fb = FunctionBuilder::new(*symbol, IrType::new("Int")).model_stub();
            fb.ret(None);
            mb.add_function(fb.finish());
        }
        Arc::new(canonical(mb.finish()))
    }

    #[test]
    fn test_user_definition_wins_over_model() {
        let user = module_with("app", &["lib.f()"]);
        let model = model_with("models", &["lib.f()"]);
        let group = group(vec![user], vec![model]).unwrap();

        let id = group.resolve("lib.f()").unwrap();
        let function = group.get(id).unwrap();
        assert_eq!(function.module, "app");
        assert!(!function.is_model);
    }

    #[test]
    fn test_duplicate_user_symbols_rejected() {
        let a = module_with("a", &["dup()"]);
        let b = module_with("b", &["dup()"]);
        let err = group(vec![a, b], vec![]).unwrap_err();
        assert_eq!(
            err,
            LinkError::DuplicateSymbol {
                symbol: "dup()".to_string(),
                first: "a".to_string(),
                second: "b".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_model_symbols_first_wins() {
        let m1 = model_with("models.a", &["lib.f()"]);
        let m2 = model_with("models.b", &["lib.f()"]);
        let group = group(vec![], vec![m1, m2]).unwrap();
        let id = group.resolve("lib.f()").unwrap();
        assert_eq!(group.get(id).unwrap().module, "models.a");
    }

    #[test]
    fn test_user_reference_degrades_to_unresolved() {
        let mut mb = ModuleBuilder::new("app");
        let mut fb = FunctionBuilder::new("app.main()", IrType::new("Int"));
        let v = fb.call("mystery.f()", vec![], IrType::new("Int"));
        fb.ret(Some(v));
        mb.add_function(fb.finish());

        let group = group(vec![canonical(mb.finish())], vec![]).unwrap();
        assert!(group.is_unresolved("mystery.f()"));
    }

    #[test]
    fn test_model_reference_must_resolve() {
        let mut mb = ModuleBuilder::new("models");
        let mut fb = FunctionBuilder::new("lib.f()", IrType::new("Int")).model_stub();
        let v = fb.call("lib.missing()", vec![], IrType::new("Int"));
        fb.ret(Some(v));
        mb.add_function(fb.finish());
        let model = Arc::new(canonical(mb.finish()));

        let err = group(vec![], vec![model]).unwrap_err();
        assert!(matches!(err, LinkError::DanglingModelReference { symbol, .. } if symbol == "lib.missing()"));
    }

    #[test]
    fn test_inspectors_observe_modules() {
        use std::cell::Cell;
        let seen = Cell::new(0usize);
        let count = |_m: &CanonicalModule| seen.set(seen.get() + 1);

        let user = module_with("app", &["app.main()"]);
        let model = model_with("models", &["lib.f()"]);
        group_with_inspectors(vec![user], vec![model], Some(&count), Some(&count)).unwrap();
        assert_eq!(seen.get(), 2);
    }
}
