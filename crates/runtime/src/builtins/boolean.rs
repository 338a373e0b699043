//! Boolean connectives. Strict (non-short-circuiting): both operands are
//! already on the stack by the time these run.

use joy_core::{Arity, ElementType, JoyError, Stack, Valency, Value};

use super::{native, register, type_error, underflow};
use crate::library::LibraryHandle;

fn pop_bool(name: &str, stack: Stack) -> Result<(Stack, bool), JoyError> {
    let (rest, v) = stack.pop().ok_or_else(|| underflow(name, 1, &stack))?;
    match v {
        Value::Bool(b) => Ok((rest, b)),
        other => Err(type_error(name, "a bool", &other)),
    }
}

pub fn install(library: &LibraryHandle) {
    let bool2 = vec![ElementType::Bool, ElementType::Bool];
    let bool1 = vec![ElementType::Bool];

    register(library, "and", Arity::Fixed(2), Valency::Fixed(1), bool2.clone(), bool1.clone(),
        native(|s| {
            let (rest, b) = pop_bool("and", s)?;
            let (rest, a) = pop_bool("and", rest)?;
            Ok(rest.push(Value::Bool(a && b)))
        }));
    register(library, "or", Arity::Fixed(2), Valency::Fixed(1), bool2, bool1.clone(),
        native(|s| {
            let (rest, b) = pop_bool("or", s)?;
            let (rest, a) = pop_bool("or", rest)?;
            Ok(rest.push(Value::Bool(a || b)))
        }));
    register(library, "not", Arity::Fixed(1), Valency::Fixed(1), bool1.clone(), bool1,
        native(|s| {
            let (rest, a) = pop_bool("not", s)?;
            Ok(rest.push(Value::Bool(!a)))
        }));
}
