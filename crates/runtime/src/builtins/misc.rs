//! Identity, I/O-adjacent, and assertion operators that don't fit the other
//! built-in groups.

use joy_core::{Arity, ElementType, JoyError, Valency, Value};

use super::{native, register, underflow};
use crate::library::LibraryHandle;

pub fn install(library: &LibraryHandle) {
    let any1 = vec![ElementType::Any];

    register(library, "id", Arity::Fixed(1), Valency::Fixed(1), any1.clone(), any1.clone(),
        native(|s| Ok(s)));

    register(library, "put!", Arity::Fixed(1), Valency::Fixed(0), any1.clone(), vec![],
        native(|s| {
            let (rest, v) = s.pop().ok_or_else(|| underflow("put!", 1, &s))?;
            println!("{v}");
            Ok(rest)
        }));

    register(library, "assert!", Arity::Fixed(1), Valency::Fixed(0), vec![ElementType::Bool], vec![],
        native(|s| {
            let (rest, v) = s.pop().ok_or_else(|| underflow("assert!", 1, &s))?;
            match v {
                Value::Bool(true) => Ok(rest),
                Value::Bool(false) => Err(JoyError::Assertion { op: None, span: None }),
                other => Err(super::type_error("assert!", "a bool", &other)),
            }
        }));

    register(library, "raise!", Arity::Fixed(1), Valency::Fixed(0), any1, vec![],
        native(|s| {
            let (_, v) = s.pop().ok_or_else(|| underflow("raise!", 1, &s))?;
            match v {
                Value::Error(e) => Err(e.as_ref().clone()),
                other => Err(super::type_error("raise!", "an error value", &other)),
            }
        }));

    register(library, "stack-size", Arity::WholeStack, Valency::Fixed(1), vec![], vec![ElementType::Int],
        native(|s| {
            let len = joy_core::stack::to_vec(&s).len();
            Ok(s.push(Value::Int(num_bigint::BigInt::from(len))))
        }));
}
