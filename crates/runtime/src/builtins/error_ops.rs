//! Inspecting a captured `Value::Error`, the only way a Joy program sees a
//! failure that `exec!` recovered instead of propagating.

use joy_core::{Arity, ElementType, JoyError, Stack, Valency, Value};

use super::{native, register, type_error, underflow};
use crate::library::LibraryHandle;

fn pop_error(name: &str, stack: &Stack) -> Result<(Stack, std::rc::Rc<JoyError>), JoyError> {
    let (rest, v) = stack.pop().ok_or_else(|| underflow(name, 1, stack))?;
    match v {
        Value::Error(e) => Ok((rest, e)),
        other => Err(type_error(name, "a captured error", &other)),
    }
}

pub fn install(library: &LibraryHandle) {
    let error1 = vec![ElementType::Any];

    register(library, "error-kind", Arity::Fixed(1), Valency::Fixed(1), error1.clone(), vec![ElementType::Symbol],
        native(|s| {
            let (rest, e) = pop_error("error-kind", &s)?;
            Ok(rest.push(Value::symbol(e.kind_name().as_bytes().to_vec())))
        }));

    register(library, "error-message", Arity::Fixed(1), Valency::Fixed(1), error1.clone(), vec![ElementType::String],
        native(|s| {
            let (rest, e) = pop_error("error-message", &s)?;
            Ok(rest.push(Value::string(e.to_string())))
        }));

    register(library, "error-data", Arity::Fixed(1), Valency::Fixed(1), error1, vec![ElementType::List],
        native(|s| {
            let (rest, e) = pop_error("error-data", &s)?;
            let op = e.op_name().map(Value::string);
            let items: Vec<Value> = op.into_iter().collect();
            Ok(rest.push(Value::list(items)))
        }));
}
