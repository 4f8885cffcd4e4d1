//! Termination on recursive call graphs
//!
//! The per-function fact merge must make recursion converge: one summarized
//! finding per reachable sink, never one per unrolled recursion depth.

mod common;

use common::{prepare, spec, SINK, SOURCE};
use taintflow_ir::{analyze, Direction, FunctionBuilder, IrType, ModuleBuilder};

fn string_ty() -> IrType {
    IrType::new("String")
}

fn unit_ty() -> IrType {
    IrType::new("()")
}

#[test]
fn test_self_recursion_terminates_with_one_finding() {
    // main: f(source())    f(x): sink(x); f(x)
    let mut mb = ModuleBuilder::new("playground");

    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let _ = main.call("playground.f(x: String) -> ()", vec![a], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    let mut f = FunctionBuilder::new("playground.f(x: String) -> ()", unit_ty());
    let x = f.param(string_ty());
    let _ = f.call(SINK, vec![x], unit_ty());
    let _ = f.call("playground.f(x: String) -> ()", vec![x], unit_ty());
    f.ret(None);
    mb.add_function(f.finish());

    let (group, graph) = prepare(mb.finish());
    for direction in [Direction::Forward, Direction::Backward] {
        let results = analyze(&group, &graph, &spec(), direction).unwrap();
        assert_eq!(results.len(), 1, "direction {:?}", direction);
        assert!(results.is_complete(), "direction {:?}", direction);
    }
}

#[test]
fn test_mutual_recursion_terminates() {
    // main: ping(source())    ping(x): pong(x)    pong(x): sink(x); ping(x)
    let mut mb = ModuleBuilder::new("playground");

    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let _ = main.call("playground.ping(x: String) -> ()", vec![a], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    let mut ping = FunctionBuilder::new("playground.ping(x: String) -> ()", unit_ty());
    let px = ping.param(string_ty());
    let _ = ping.call("playground.pong(x: String) -> ()", vec![px], unit_ty());
    ping.ret(None);
    mb.add_function(ping.finish());

    let mut pong = FunctionBuilder::new("playground.pong(x: String) -> ()", unit_ty());
    let qx = pong.param(string_ty());
    let _ = pong.call(SINK, vec![qx], unit_ty());
    let _ = pong.call("playground.ping(x: String) -> ()", vec![qx], unit_ty());
    pong.ret(None);
    mb.add_function(pong.finish());

    let (group, graph) = prepare(mb.finish());
    let results = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.is_complete());
}

#[test]
fn test_recursive_value_return_converges() {
    // g calls itself with its own argument and returns that argument; the
    // summary-style return edge must reach a fixed point instead of looping
    let mut mb = ModuleBuilder::new("playground");

    let mut main = FunctionBuilder::new("playground.main()", unit_ty());
    let a = main.call(SOURCE, vec![], string_ty());
    let r = main.call("playground.g(x: String) -> String", vec![a], string_ty());
    let _ = main.call(SINK, vec![r], unit_ty());
    main.ret(None);
    mb.add_function(main.finish());

    let mut g = FunctionBuilder::new("playground.g(x: String) -> String", string_ty());
    let x = g.param(string_ty());
    let _inner = g.call("playground.g(x: String) -> String", vec![x], string_ty());
    g.ret(Some(x));
    mb.add_function(g.finish());

    let (group, graph) = prepare(mb.finish());
    let results = analyze(&group, &graph, &spec(), Direction::Forward).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.is_complete());

    // Sanity: the group and graph really contain the cycle
    let g_id = group.resolve("playground.g(x: String) -> String").unwrap();
    assert!(graph.callees_of(g_id).contains(&g_id));
}
