//! End-to-end scenarios: raw program in, findings out
//!
//! The linear playground program is the canonical acceptance case: with the
//! sanitizer in the chain no finding may be reported; without it, exactly
//! one, whose witness path is the two-entry source-site -> sink-site path.

mod common;

use common::{linear_program, model_module, prepare, spec, SANITIZER, SINK, SOURCE};
use pretty_assertions::assert_eq;
use taintflow_ir::{
    analyze, analyze_with_options, AnalysisOptions, Direction, FunctionBuilder, IrType, Literal,
    ModuleBuilder, Orchestrator, RunState, TaintAnalysis,
};

fn string_ty() -> IrType {
    IrType::new("String")
}

fn unit_ty() -> IrType {
    IrType::new("()")
}

#[test]
fn test_sanitized_flow_reports_nothing_forward() {
    let (group, graph) = prepare(linear_program(true));
    let results = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();
    assert_eq!(results.findings, vec![]);
    assert_eq!(results.seeds, 1);
    assert!(results.is_complete());
}

#[test]
fn test_unsanitized_flow_reports_exactly_one_finding_forward() {
    let (group, graph) = prepare(linear_program(false));
    let results = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();

    assert_eq!(results.len(), 1);
    let finding = &results.findings[0];
    assert_eq!(finding.source_symbol, SOURCE);
    assert_eq!(finding.sink_symbol, SINK);
    // The witness path is exactly source call site -> sink call site
    assert_eq!(finding.path, vec![finding.source, finding.sink]);
    assert_eq!(finding.source.function, finding.sink.function);
}

#[test]
fn test_sanitized_flow_reports_nothing_backward() {
    let (group, graph) = prepare(linear_program(true));
    let results = analyze(&group, &graph, &spec(), Direction::Backward).unwrap();
    assert_eq!(results.findings, vec![]);
}

#[test]
fn test_backward_agrees_with_forward_on_direct_flow() {
    let (group, graph) = prepare(linear_program(false));
    let forward = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();
    let backward = analyze(&group, &graph, &spec(), Direction::Backward).unwrap();

    assert_eq!(forward.len(), 1);
    assert_eq!(backward.len(), 1);
    assert_eq!(forward.findings[0].source, backward.findings[0].source);
    assert_eq!(forward.findings[0].sink, backward.findings[0].sink);
    assert_eq!(forward.findings[0].path, backward.findings[0].path);
}

#[test]
fn test_multiple_sinks_from_one_source_all_reported() {
    let mut mb = ModuleBuilder::new("playground");
    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let _ = main.call(SINK, vec![a], unit_ty());
    let _ = main.call(SINK, vec![a], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    let (group, graph) = prepare(mb.finish());
    let results = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();
    assert_eq!(results.len(), 2);
    assert_ne!(results.findings[0].sink, results.findings[1].sink);
}

#[test]
fn test_interprocedural_flow_through_helper() {
    // main: a = source(); helper(a)   helper(x): sink(x)
    let mut mb = ModuleBuilder::new("playground");

    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let _ = main.call("playground.helper(x: String) -> ()", vec![a], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    let mut helper = FunctionBuilder::new("playground.helper(x: String) -> ()", unit_ty());
    let x = helper.param(string_ty());
    let _ = helper.call(SINK, vec![x], unit_ty());
    helper.ret(None);
    mb.add_function(helper.finish());

    let (group, graph) = prepare(mb.finish());
    let results = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();

    assert_eq!(results.len(), 1);
    let finding = &results.findings[0];
    // source site -> helper call site -> sink site
    assert_eq!(finding.path.len(), 3);
    assert_eq!(finding.path[0], finding.source);
    assert_eq!(finding.path[2], finding.sink);
    assert_ne!(finding.source.function, finding.sink.function);
}

#[test]
fn test_unresolved_callee_is_conservative_black_box() {
    // `mystery` resolves nowhere; its result must stay tainted
    let mut mb = ModuleBuilder::new("playground");
    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let b = main.call("mystery.transform(x: String) -> String", vec![a], string_ty());
    let _ = main.call(SINK, vec![b], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    let (group, graph) = prepare(mb.finish());
    assert!(group.is_unresolved("mystery.transform(x: String) -> String"));

    let results = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.unresolved_call_count >= 1);
}

#[test]
fn test_unresolved_symbol_still_matches_specification_exactly() {
    // A sanitizer that resolves nowhere still sanitizes by exact name
    let mut mb = ModuleBuilder::new("playground");
    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let b = main.call(SANITIZER, vec![a], string_ty());
    let _ = main.call(SINK, vec![b], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    // No model module: source/sink/sanitizer are all unresolved externals
    let canonical = taintflow_ir::canonicalize(&mb.finish()).unwrap();
    let group = taintflow_ir::group(vec![canonical], vec![]).unwrap();
    let graph = taintflow_ir::build_call_graph(&group);
    let results = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();
    assert_eq!(results.findings, vec![]);
}

#[test]
fn test_taint_through_field_cells() {
    // obj.payload = source(); sink(obj.payload)
    let mut mb = ModuleBuilder::new("playground");
    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let obj = main.literal(Literal::String("container".into()), IrType::new("Box"));
    let a = main.call(SOURCE, vec![], string_ty());
    main.field_write(obj, "payload", a);
    let read = main.field_read(obj, "payload", string_ty());
    let _ = main.call(SINK, vec![read], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    let (group, graph) = prepare(mb.finish());
    let results = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn test_taint_through_block_params() {
    // Taint passed as a branch argument reaches the join block's parameter
    let mut mb = ModuleBuilder::new("playground");
    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let join = main.add_block();
    let carried = main.block_param(join, string_ty());
    main.branch(join, vec![a]);
    main.switch_to(join);
    let _ = main.call(SINK, vec![carried], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    let (group, graph) = prepare(mb.finish());
    for direction in [Direction::Forward, Direction::Backward] {
        let results = analyze(&group, &graph, &spec(), direction).unwrap();
        assert_eq!(results.len(), 1, "direction {:?}", direction);
    }
}

#[test]
fn test_every_witness_site_is_a_known_call_site() {
    let mut mb = ModuleBuilder::new("playground");

    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let _ = main.call("playground.helper(x: String) -> ()", vec![a], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    let mut helper = FunctionBuilder::new("playground.helper(x: String) -> ()", unit_ty());
    let x = helper.param(string_ty());
    let _ = helper.call(SINK, vec![x], unit_ty());
    helper.ret(None);
    mb.add_function(helper.finish());

    let (group, graph) = prepare(mb.finish());
    let results = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();

    for finding in &results.findings {
        for site in &finding.path {
            assert!(
                !graph.targets_at(site).is_empty(),
                "witness site {site} is not a call site of the built graph"
            );
            assert!(group.get(site.function).is_some());
        }
    }
}

#[test]
fn test_budget_marks_seed_incomplete_instead_of_failing() {
    // Wide fan-out: one source value copied through many assignments
    let mut mb = ModuleBuilder::new("playground");
    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let mut current = a;
    for _ in 0..64 {
        current = main.assign(current, string_ty());
    }
    let _ = main.call(SINK, vec![current], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    let (group, graph) = prepare(mb.finish());
    let options = AnalysisOptions::forward().with_max_facts_per_seed(8);
    let results = analyze_with_options(&group, &graph, &spec(), options).unwrap();

    assert!(!results.is_complete());
    assert_eq!(results.incomplete_seeds.len(), 1);
}

#[test]
fn test_run_state_machine() {
    let (group, graph) = prepare(linear_program(false));
    let spec = spec();
    let mut analysis = TaintAnalysis::new(&group, &graph, &spec, AnalysisOptions::forward());
    assert_eq!(analysis.state(), RunState::NotStarted);
    analysis.run().unwrap();
    assert_eq!(analysis.state(), RunState::Completed);
}

#[test]
fn test_orchestrator_excludes_failed_module_and_continues() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc as StdArc;

    struct Counter(StdArc<AtomicUsize>);
    impl taintflow_ir::PipelineObserver for Counter {
        fn on_raw_module(&self, _m: &taintflow_ir::RawModule) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn on_canonical_module(&self, _m: &taintflow_ir::CanonicalModule) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let good = linear_program(false);
    let mut bad_builder = ModuleBuilder::new("broken");
    let mut f = FunctionBuilder::new("broken.f()", unit_ty());
    f.unknown("mystery_op", None);
    f.ret(None);
    bad_builder.add_function(f.finish());
    let bad = bad_builder.finish();

    let seen = StdArc::new(AtomicUsize::new(0));
    let mut orchestrator = Orchestrator::new(AnalysisOptions::forward());
    orchestrator.add_observer(Box::new(Counter(StdArc::clone(&seen))));

    let result = orchestrator
        .run(vec![good, bad], vec![model_module()], &spec())
        .unwrap();

    assert_eq!(result.failed_modules.len(), 1);
    assert_eq!(result.failed_modules[0].module, "broken");
    assert_eq!(result.results.len(), 1);
    // 2 raw modules + 1 canonical module observed
    assert_eq!(seen.load(Ordering::SeqCst), 3);

    let rendered = result.results.to_string();
    assert!(rendered.contains("1 finding(s)"));
}
