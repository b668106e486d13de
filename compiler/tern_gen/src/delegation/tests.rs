use pretty_assertions::assert_eq;
use tern_value::{Array, ArrayKey, ObjectValue, Value, GENERATOR_CLASS};

use super::{DelegateStep, Delegation};
use crate::errors::GeneratorError;
use crate::test_helpers::{drain, MockEngine, MockOp};

fn s(text: &str) -> Value {
    Value::string(text)
}

fn int(n: i64) -> Value {
    Value::Int(n)
}

#[test]
fn array_source_preserves_insertion_order_and_keys() {
    let source = Value::map([
        (ArrayKey::from("x"), int(1)),
        (ArrayKey::from(5), int(2)),
        (ArrayKey::from("y"), int(3)),
    ]);
    let engine = MockEngine::new().with_script(
        "outer",
        vec![
            MockOp::YieldFrom(source),
            MockOp::RecordDelegationResult,
            MockOp::YieldValue(s("after")),
        ],
    );
    let mut generator = engine.generator("outer", vec![]);

    assert_eq!(
        drain(&mut generator),
        vec![
            (s("x"), int(1)),
            (int(5), int(2)),
            (s("y"), int(3)),
            (int(0), s("after")),
        ]
    );
    assert_eq!(engine.log(), vec![Value::Null]);
}

#[test]
fn list_source_yields_positional_keys() {
    let engine = MockEngine::new().with_script(
        "outer",
        vec![MockOp::YieldFrom(Value::list([int(10), int(20), int(30)]))],
    );
    let mut generator = engine.generator("outer", vec![]);

    assert_eq!(
        drain(&mut generator),
        vec![(int(0), int(10)), (int(1), int(20)), (int(2), int(30))]
    );
    assert!(generator.is_finished());
}

#[test]
fn empty_array_produces_nothing_and_body_continues() {
    let engine = MockEngine::new().with_script(
        "outer",
        vec![
            MockOp::YieldFrom(Value::array(Array::new())),
            MockOp::YieldValue(s("only")),
        ],
    );
    let mut generator = engine.generator("outer", vec![]);

    assert!(generator.next());
    assert!(!generator.is_delegating());
    assert_eq!((generator.key(), generator.current()), (int(0), s("only")));
    assert!(!generator.next());
}

#[test]
fn empty_array_as_whole_body_finishes_immediately() {
    let engine =
        MockEngine::new().with_script("outer", vec![MockOp::YieldFrom(Value::array(Array::new()))]);
    let mut generator = engine.generator("outer", vec![]);

    assert!(!generator.next());
    assert!(generator.is_finished());
}

#[test]
fn reference_to_array_is_dereferenced() {
    let source = Value::reference(Value::list([s("a"), s("b")]));
    let engine = MockEngine::new().with_script("outer", vec![MockOp::YieldFrom(source)]);
    let mut generator = engine.generator("outer", vec![]);

    assert_eq!(
        drain(&mut generator),
        vec![(int(0), s("a")), (int(1), s("b"))]
    );
}

#[test]
fn delegation_state_is_visible_while_walking_source() {
    let engine = MockEngine::new().with_script(
        "outer",
        vec![
            MockOp::YieldFrom(Value::list([int(1), int(2)])),
            MockOp::YieldValue(int(3)),
        ],
    );
    let mut generator = engine.generator("outer", vec![]);

    assert!(generator.next());
    assert!(generator.is_delegating());
    assert!(generator.next());
    assert!(generator.is_delegating());
    assert!(generator.next());
    assert!(!generator.is_delegating());
    assert_eq!(generator.current(), int(3));
}

#[test]
fn nested_generator_pairs_are_forwarded_unmodified() {
    let engine = MockEngine::new()
        .with_script(
            "inner",
            vec![
                MockOp::Yield(s("k1"), int(1)),
                MockOp::Yield(int(7), int(2)),
                MockOp::Return(int(42)),
            ],
        )
        .with_script(
            "outer",
            vec![
                MockOp::YieldFromArg(0),
                MockOp::RecordDelegationResult,
                MockOp::YieldValue(s("done")),
            ],
        );
    let child = engine.generator("inner", vec![]).into_value();
    let mut generator = engine.generator("outer", vec![child]);

    assert_eq!(
        drain(&mut generator),
        vec![(s("k1"), int(1)), (int(7), int(2)), (int(0), s("done"))]
    );
    assert_eq!(engine.log(), vec![int(42)]);
}

#[test]
fn partially_consumed_child_is_advanced_past_its_current_pair() {
    let engine = MockEngine::new()
        .with_script(
            "inner",
            vec![
                MockOp::YieldValue(int(1)),
                MockOp::YieldValue(int(2)),
                MockOp::YieldValue(int(3)),
            ],
        )
        .with_script("outer", vec![MockOp::YieldFromArg(0)]);
    let child = engine.generator("inner", vec![]).into_ref();
    assert!(child.try_lock().unwrap().next());

    let mut generator = engine.generator("outer", vec![Value::generator(child.clone())]);
    assert_eq!(
        drain(&mut generator),
        vec![(int(1), int(2)), (int(2), int(3))]
    );
    assert!(child.try_lock().unwrap().is_finished());
}

#[test]
fn exhausted_child_contributes_its_return_value_only() {
    let engine = MockEngine::new()
        .with_script("inner", vec![MockOp::Return(s("ret"))])
        .with_script(
            "outer",
            vec![
                MockOp::YieldFromArg(0),
                MockOp::RecordDelegationResult,
                MockOp::YieldValue(s("next")),
            ],
        );
    let child = engine.generator("inner", vec![]).into_ref();
    assert!(!child.try_lock().unwrap().next());

    let mut generator = engine.generator("outer", vec![Value::generator(child)]);
    assert_eq!(drain(&mut generator), vec![(int(0), s("next"))]);
    assert_eq!(engine.log(), vec![s("ret")]);
}

#[test]
fn values_sent_while_delegating_reach_the_child() {
    let engine = MockEngine::new()
        .with_script(
            "inner",
            vec![
                MockOp::YieldValue(int(1)),
                MockOp::RecordSent,
                MockOp::YieldValue(int(2)),
            ],
        )
        .with_script("outer", vec![MockOp::YieldFromArg(0)]);
    let child = engine.generator("inner", vec![]).into_value();
    let mut generator = engine.generator("outer", vec![child]);

    assert!(generator.next());
    assert!(generator.send(s("ping")));
    assert_eq!(generator.current(), int(2));
    assert_eq!(engine.log(), vec![s("ping")]);
}

#[test]
fn child_failure_finalizes_the_outer_generator() {
    let engine = MockEngine::new()
        .with_script(
            "inner",
            vec![MockOp::YieldValue(int(1)), MockOp::Fail("child broke")],
        )
        .with_script(
            "outer",
            vec![MockOp::YieldFromArg(0), MockOp::YieldValue(s("unreached"))],
        );
    let child = engine.generator("inner", vec![]).into_value();
    let mut generator = engine.generator("outer", vec![child]);

    assert!(generator.next());
    assert!(!generator.next());
    assert!(generator.is_finished());
    match generator.last_error() {
        Some(GeneratorError::DelegateFailed { function, message }) => {
            assert_eq!(function, "inner");
            assert_eq!(message, "execution failed: mock failure: child broke");
        }
        other => panic!("expected DelegateFailed, got {other:?}"),
    }
}

#[test]
fn closing_outer_leaves_child_running() {
    let engine = MockEngine::new()
        .with_script(
            "inner",
            vec![MockOp::YieldValue(int(1)), MockOp::YieldValue(int(2))],
        )
        .with_script("outer", vec![MockOp::YieldFromArg(0)]);
    let child = engine.generator("inner", vec![]).into_ref();
    let mut generator = engine.generator("outer", vec![Value::generator(child.clone())]);

    assert!(generator.next());
    generator.close();
    assert!(!generator.is_delegating());

    let mut guard = child.try_lock().unwrap();
    assert!(guard.valid());
    assert!(guard.next());
    assert_eq!(guard.current(), int(2));
}

#[test]
fn unsupported_source_is_rejected() {
    let error = Delegation::start(int(5)).err();
    assert!(matches!(
        error,
        Some(GeneratorError::UnsupportedDelegationSource { type_name: "int" })
    ));
}

#[test]
fn unsupported_source_fails_the_body() {
    let engine = MockEngine::new().with_script("outer", vec![MockOp::YieldFrom(s("text"))]);
    let mut generator = engine.generator("outer", vec![]);

    let message = generator.try_next().err().map(|e| e.to_string());
    assert_eq!(
        message,
        Some(
            "execution failed: can use \"yield from\" only with arrays and generators, string given"
                .to_owned()
        )
    );
    assert!(generator.is_finished());
}

#[test]
fn reference_assigned_to_itself_is_an_unsupported_source() {
    let slot = Value::reference(Value::Null);
    let Value::Reference(cell) = &slot else {
        panic!("expected a reference cell");
    };
    cell.set(slot.clone());

    let engine = MockEngine::new().with_script("outer", vec![MockOp::YieldFromArg(0)]);
    let mut generator = engine.generator("outer", vec![slot]);

    let error = generator.try_next().unwrap_err();
    assert_eq!(
        error.to_string(),
        "execution failed: can use \"yield from\" only with arrays and generators, null given"
    );
    assert!(generator.is_finished());
}

#[test]
fn generator_object_without_binding_is_rejected() {
    let unbound = Value::object(ObjectValue::new(GENERATOR_CLASS));
    assert!(matches!(
        Delegation::start(unbound).err(),
        Some(GeneratorError::MissingDelegationBinding)
    ));

    let plain = Value::object(ObjectValue::new("Widget"));
    assert!(matches!(
        Delegation::start(plain).err(),
        Some(GeneratorError::UnsupportedDelegationSource { type_name: "object" })
    ));
}

#[test]
fn delegating_to_itself_reports_already_running() {
    let engine = MockEngine::new().with_script("selfish", vec![MockOp::YieldFromArg(0)]);
    let slot = Value::reference(Value::Null);
    let handle = engine.generator("selfish", vec![slot.clone()]).into_ref();
    let Value::Reference(cell) = &slot else {
        panic!("expected a reference cell");
    };
    cell.set(Value::generator(handle.clone()));

    {
        let mut guard = handle.try_lock().unwrap();
        assert!(!guard.next());
        assert!(guard.is_finished());
        assert_eq!(
            guard.last_error_message(),
            Some("execution failed: cannot resume an already running generator".to_owned())
        );
    }

    cell.set(Value::Null);
}

#[test]
fn array_delegation_steps_directly() {
    let (mut delegation, first) = Delegation::start(Value::list([s("a")])).unwrap();
    assert!(!delegation.is_generator());
    assert!(matches!(
        first,
        DelegateStep::Pair { key: Value::Int(0), .. }
    ));
    assert!(matches!(
        delegation.advance(Some(s("ignored"))),
        DelegateStep::Exhausted { result: Value::Null }
    ));
}
