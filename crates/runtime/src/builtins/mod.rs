//! The built-in operator set: always registered on a fresh `Runtime`,
//! unlike the namespaced operators a native extension module would expose.
//! Grounded in the reference interpreter's core operator table, not any
//! one host-specific module.

mod arithmetic;
mod boolean;
mod compare;
mod dict_ops;
mod error_ops;
mod list_ops;
mod misc;
mod predicates;
mod string_ops;
mod struct_ops;

use std::rc::Rc;

use joy_core::{Arity, ElementType, JoyError, NativeCallable, NativeFunction, Signature, Stack, Valency, Value};

use crate::library::LibraryHandle;

pub(crate) fn underflow(name: &str, need: usize, stack: &Stack) -> JoyError {
    JoyError::Stack {
        message: format!("`{name}` needs {need} argument(s)"),
        op: Some(name.to_string()),
        span: None,
        stack_snapshot: joy_core::stack::to_vec(stack).iter().map(|v| v.to_string()).collect(),
    }
}

pub(crate) fn type_error(name: &str, expected: &str, found: &Value) -> JoyError {
    JoyError::Type {
        message: format!("`{name}` expected {expected}, found {}", found.type_name()),
        span: None,
    }
}

pub(crate) fn register(
    library: &LibraryHandle,
    name: &str,
    arity: Arity,
    valency: Valency,
    inputs: Vec<ElementType>,
    outputs: Vec<ElementType>,
    call: NativeCallable,
) {
    let signature = Signature::new(arity, valency, inputs, outputs);
    library
        .borrow_mut()
        .add_function(name, NativeFunction { name: Rc::from(name), signature, call })
        .expect("built-in signatures are always complete");
}

pub(crate) fn native(f: impl Fn(Stack) -> Result<Stack, JoyError> + 'static) -> NativeCallable {
    Rc::new(f)
}

/// Installs the full built-in operator set into a freshly created library.
pub fn install(library: &LibraryHandle) {
    library.borrow_mut().add_constant("true", Value::Bool(true));
    library.borrow_mut().add_constant("false", Value::Bool(false));
    library.borrow_mut().add_factory("dict", Rc::new(crate::library::fresh_dict));

    register(
        library,
        "stack",
        Arity::WholeStack,
        Valency::Fixed(1),
        vec![],
        vec![ElementType::List],
        native(|s| {
            let list = Value::list(joy_core::stack::to_vec(&s));
            Ok(s.push(list))
        }),
    );
    register(
        library,
        "unstack",
        Arity::Fixed(1),
        Valency::ReplaceStack,
        vec![ElementType::List],
        vec![ElementType::Any],
        native(|s| {
            let (_, top) = s.pop().ok_or_else(|| underflow("unstack", 1, &s))?;
            match top {
                Value::List(items) => Ok(joy_core::stack::from_vec(&items)),
                other => Err(type_error("unstack", "a list", &other)),
            }
        }),
    );
    register(library, "dup", Arity::Fixed(1), Valency::Fixed(2), vec![ElementType::Any], vec![ElementType::Any, ElementType::Any], native(|s| joy_core::stack::dup(&s)));
    register(library, "swap", Arity::Fixed(2), Valency::Fixed(2), vec![ElementType::Any, ElementType::Any], vec![ElementType::Any, ElementType::Any], native(|s| joy_core::stack::swap(&s)));
    register(library, "pop", Arity::Fixed(1), Valency::Fixed(0), vec![ElementType::Any], vec![], native(|s| joy_core::stack::drop_top(&s)));
    register(library, "over", Arity::Fixed(2), Valency::Fixed(3), vec![ElementType::Any, ElementType::Any], vec![ElementType::Any, ElementType::Any, ElementType::Any], native(|s| joy_core::stack::over(&s)));
    register(library, "nip", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Any, ElementType::Any], vec![ElementType::Any], native(|s| joy_core::stack::nip(&s)));
    register(library, "tuck", Arity::Fixed(2), Valency::Fixed(3), vec![ElementType::Any, ElementType::Any], vec![ElementType::Any, ElementType::Any, ElementType::Any], native(|s| joy_core::stack::tuck(&s)));
    register(library, "rot", Arity::Fixed(3), Valency::Fixed(3), vec![ElementType::Any; 3], vec![ElementType::Any; 3], native(|s| joy_core::stack::rot(&s)));
    register(library, "2dup", Arity::Fixed(2), Valency::Fixed(4), vec![ElementType::Any, ElementType::Any], vec![ElementType::Any; 4], native(|s| joy_core::stack::two_dup(&s)));

    arithmetic::install(library);
    compare::install(library);
    boolean::install(library);
    list_ops::install(library);
    string_ops::install(library);
    dict_ops::install(library);
    error_ops::install(library);
    struct_ops::install(library);
    predicates::install(library);
    misc::install(library);

    install_aliases(library);
}

/// Symbolic aliases for the canonical word names, matching the reference
/// interpreter's `aliases` table.
fn install_aliases(library: &LibraryHandle) {
    let mut lib = library.borrow_mut();
    lib.add_alias("+", "add");
    lib.add_alias("-", "sub");
    lib.add_alias("*", "mul");
    lib.add_alias("/", "div");
    lib.add_alias("%", "rem");
    lib.add_alias(">", "gt");
    lib.add_alias(">=", "gte");
    lib.add_alias("<", "lt");
    lib.add_alias("<=", "lte");
    lib.add_alias("=", "equal?");
    lib.add_alias("!=", "differ?");
    lib.add_alias("<>", "differ?");
    lib.add_alias("size", "length");
}
