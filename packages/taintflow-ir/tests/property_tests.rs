//! Property tests over generated straight-line programs
//!
//! Programs are generated as op lists where every operand index refers to
//! an already-defined value, so each generated module is well-formed by
//! construction and must canonicalize.

use proptest::prelude::*;
use taintflow_ir::{
    canonicalize, BinOp, FunctionBuilder, IrType, Literal, ModuleBuilder, RawModule,
};

#[derive(Debug, Clone)]
enum GenOp {
    Literal(i64),
    Assign(prop::sample::Index),
    Binary(prop::sample::Index, prop::sample::Index),
    FieldWrite(prop::sample::Index, prop::sample::Index),
    FieldRead(prop::sample::Index),
    Call(u8, Vec<prop::sample::Index>),
}

fn arb_op() -> impl Strategy<Value = GenOp> {
    prop_oneof![
        any::<i64>().prop_map(GenOp::Literal),
        any::<prop::sample::Index>().prop_map(GenOp::Assign),
        (any::<prop::sample::Index>(), any::<prop::sample::Index>())
            .prop_map(|(a, b)| GenOp::Binary(a, b)),
        (any::<prop::sample::Index>(), any::<prop::sample::Index>())
            .prop_map(|(a, b)| GenOp::FieldWrite(a, b)),
        any::<prop::sample::Index>().prop_map(GenOp::FieldRead),
        (0u8..4, prop::collection::vec(any::<prop::sample::Index>(), 0..3))
            .prop_map(|(callee, args)| GenOp::Call(callee, args)),
    ]
}

fn arb_program() -> impl Strategy<Value = Vec<GenOp>> {
    prop::collection::vec(arb_op(), 1..24)
}

fn build_module(ops: &[GenOp]) -> RawModule {
    let ty = IrType::new("Int");
    let mut fb = FunctionBuilder::new("generated.f()", ty.clone());
    // Anchor value so operand indices always have something to pick
    let mut values = vec![fb.literal(Literal::Int(0), ty.clone())];

    for op in ops {
        match op {
            GenOp::Literal(n) => values.push(fb.literal(Literal::Int(*n), ty.clone())),
            GenOp::Assign(i) => {
                let from = *i.get(&values);
                values.push(fb.assign(from, ty.clone()));
            }
            GenOp::Binary(a, b) => {
                let lhs = *a.get(&values);
                let rhs = *b.get(&values);
                values.push(fb.binary(BinOp::Add, lhs, rhs, ty.clone()));
            }
            GenOp::FieldWrite(object, value) => {
                let object = *object.get(&values);
                let value = *value.get(&values);
                fb.field_write(object, "cell", value);
            }
            GenOp::FieldRead(object) => {
                let object = *object.get(&values);
                values.push(fb.field_read(object, "cell", ty.clone()));
            }
            GenOp::Call(callee, args) => {
                let args: Vec<_> = args.iter().map(|i| *i.get(&values)).collect();
                let symbol = format!("lib.f{}()", callee);
                values.push(fb.call(symbol, args, ty.clone()));
            }
        }
    }

    let last = *values.last().unwrap();
    fb.ret(Some(last));
    let mut mb = ModuleBuilder::new("generated");
    mb.add_function(fb.finish());
    mb.finish()
}

proptest! {
    #[test]
    fn canonicalization_succeeds_on_well_formed_input(ops in arb_program()) {
        prop_assert!(canonicalize(&build_module(&ops)).is_ok());
    }

    #[test]
    fn canonicalization_is_deterministic(ops in arb_program()) {
        let module = build_module(&ops);
        let first = canonicalize(&module).unwrap();
        let second = canonicalize(&module).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn canonicalization_is_idempotent(ops in arb_program()) {
        let once = canonicalize(&build_module(&ops)).unwrap();
        let twice = canonicalize(&RawModule::from(&once)).unwrap();
        prop_assert_eq!(once, twice);
    }
}
