//! End-to-end scenarios run through the public `Runtime` façade: parse,
//! link and execute a term, then inspect the resulting stack.

use joy_runtime::Runtime;
use joy_core::Value;
use num_bigint::BigInt;

fn int(n: i64) -> Value {
    Value::Int(BigInt::from(n))
}

#[test]
fn addition() {
    let runtime = Runtime::new();
    let outcome = runtime.run("2 3 + .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![int(5)]);
}

#[test]
fn step_folds_a_list() {
    let runtime = Runtime::new();
    let outcome = runtime.run("0 [1 2 3] [+] step .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![int(6)]);
}

#[test]
fn i_runs_a_quotation() {
    let runtime = Runtime::new();
    let outcome = runtime.run("5 [dup *] i .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![int(25)]);
}

#[test]
fn boolean_and() {
    let runtime = Runtime::new();
    let outcome = runtime.run("true false and .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![Value::Bool(false)]);
}

#[test]
fn exec_bang_recovers_success() {
    let runtime = Runtime::new();
    let outcome = runtime.run("[ 1 2 + ] exec! .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values[0], Value::Bool(true));
    assert_eq!(values[1], Value::list(vec![int(3)]));
}

#[test]
fn exec_bang_recovers_failure() {
    let runtime = Runtime::new();
    let outcome = runtime.run("[ 1 pop pop ] exec! .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values[0], Value::Bool(false));
    assert!(matches!(values[1], Value::Error(_)));
}

#[test]
fn struct_and_unstruct_round_trip() {
    let runtime = Runtime::new();
    runtime
        .load("MODULE pairs PUBLIC MyPair :: a b; END.", "pairs.joy")
        .unwrap();
    let outcome = runtime.run("1 2.5 'MyPair struct unstruct .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![Value::Float(2.5), int(1)]);
}

#[test]
fn division_by_zero_is_a_stack_error() {
    let runtime = Runtime::new();
    let err = runtime.run("1 0 / .", "test.joy").unwrap_err();
    assert_eq!(err.kind_name(), "StackError");
}

#[test]
fn list_concat_and_size() {
    let runtime = Runtime::new();
    let outcome = runtime.run("[1 2 3] [4 5] concat size .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![int(5)]);
}

#[test]
fn dict_put_and_get() {
    let runtime = Runtime::new();
    let outcome = runtime
        .run("dict 42 'answer dict-put 'answer dict-get .", "test.joy")
        .unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![int(42)]);
}

#[test]
fn forward_reference_links_across_siblings() {
    let runtime = Runtime::new();
    runtime
        .load("MODULE arith PUBLIC foo == 1 bar; bar == 2 +; END.", "arith.joy")
        .unwrap();
    assert!(runtime.get_quotation("arith.foo").is_some());
    assert!(runtime.get_quotation("arith.bar").is_some());
    let outcome = runtime.run("arith.foo .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![int(3)]);
}

#[test]
fn symbolic_aliases_resolve_to_canonical_names() {
    let runtime = Runtime::new();
    let outcome = runtime.run("5 [dup mul] i .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![int(25)]);
}

#[test]
fn assert_bang_raises_on_false() {
    let runtime = Runtime::new();
    let outcome = runtime.run("[ false assert! ] exec! .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values[0], Value::Bool(false));
    match &values[1] {
        Value::Error(e) => assert_eq!(e.kind_name(), "AssertionError"),
        other => panic!("expected an error value, got {other:?}"),
    }
}

#[test]
fn type_predicates_and_list_folds() {
    let runtime = Runtime::new();
    let outcome = runtime.run("[1 2 3] sum [1 2 3] integer? .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![Value::Bool(false), int(6)]);
}

#[test]
fn module_definition_is_runnable() {
    let runtime = Runtime::new();
    runtime.load("MODULE test PUBLIC five == 5 ; END.", "test_mod.joy").unwrap();
    let outcome = runtime.run("test.five 3 + .", "test.joy").unwrap();
    let values = joy_core::stack::to_vec(&outcome.stack);
    assert_eq!(values, vec![int(8)]);
}
