//! Shared fixtures: a playground program in raw IR form plus the model
//! module its library calls resolve against.
#![allow(dead_code)] // Each test binary uses a different slice of these

use std::sync::Arc;

use taintflow_ir::{
    build_call_graph, canonicalize, group, CallGraph, CanonicalModule, FunctionBuilder, IrType,
    Literal, ModuleBuilder, ModuleGroup, RawModule, Specification,
};

pub const SOURCE: &str = "playground.source() -> String";
pub const SINK: &str = "playground.sink(sunk: String) -> ()";
pub const SANITIZER: &str = "playground.sanitizer(tainted: String) -> String";

pub fn spec() -> Specification {
    Specification::from_symbols("Testing", &[SOURCE], &[SINK], &[SANITIZER]).unwrap()
}

fn string_ty() -> IrType {
    IrType::new("String")
}

fn unit_ty() -> IrType {
    IrType::new("()")
}

/// Stubs for the three playground library functions
pub fn model_module() -> Arc<CanonicalModule> {
    let mut mb = ModuleBuilder::new("models.playground");

    let mut source = FunctionBuilder::new(SOURCE, string_ty()).model_stub();
    let produced = source.literal(Literal::String("input".into()), string_ty());
    source.ret(Some(produced));
    mb.add_function(source.finish());

    let mut sink = FunctionBuilder::new(SINK, unit_ty()).model_stub();
    let _sunk = sink.param(string_ty());
    sink.ret(None);
    mb.add_function(sink.finish());

    let mut sanitizer = FunctionBuilder::new(SANITIZER, string_ty()).model_stub();
    let _tainted = sanitizer.param(string_ty());
    let clean = sanitizer.literal(Literal::String("clean".into()), string_ty());
    sanitizer.ret(Some(clean));
    mb.add_function(sanitizer.finish());

    Arc::new(canonicalize(&mb.finish()).unwrap())
}

/// `let a = source(); let b = sanitizer(a); sink(b)`, or `sink(a)` when
/// `sanitized` is false
pub fn linear_program(sanitized: bool) -> RawModule {
    let mut mb = ModuleBuilder::new("playground");
    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let sunk = if sanitized {
        main.call(SANITIZER, vec![a], string_ty())
    } else {
        a
    };
    let _ = main.call(SINK, vec![sunk], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());
    mb.finish()
}

/// Canonicalize, link against the playground models, build the call graph
pub fn prepare(raw: RawModule) -> (ModuleGroup, CallGraph) {
    let canonical = canonicalize(&raw).unwrap();
    let group = group(vec![canonical], vec![model_module()]).unwrap();
    let graph = build_call_graph(&group);
    (group, graph)
}
