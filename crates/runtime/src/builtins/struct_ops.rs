//! Struct introspection. Construction and destructuring are the `struct`
//! and `unstruct` combinators (`combinators.rs`); these are the plain
//! accessors that don't need queue access.

use joy_core::{Arity, ElementType, Valency, Value};

use super::{native, register, type_error, underflow};
use crate::library::LibraryHandle;

pub fn install(library: &LibraryHandle) {
    register(library, "struct-name", Arity::Fixed(1), Valency::Fixed(1), vec![ElementType::Any], vec![ElementType::Symbol],
        native(|s| {
            let (rest, v) = s.pop().ok_or_else(|| underflow("struct-name", 1, &s))?;
            match v {
                Value::Struct(inst) => Ok(rest.push(Value::Symbol(inst.type_name.clone()))),
                other => Err(type_error("struct-name", "a struct", &other)),
            }
        }));

    register(library, "struct?", Arity::Fixed(1), Valency::Fixed(1), vec![ElementType::Any], vec![ElementType::Bool],
        native(|s| {
            let (rest, v) = s.pop().ok_or_else(|| underflow("struct?", 1, &s))?;
            let is_struct = matches!(v, Value::Struct(_));
            Ok(rest.push(Value::Bool(is_struct)))
        }));
}
