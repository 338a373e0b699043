//! Type and shape predicates over a single value.

use joy_core::{Arity, ElementType, Valency, Value};

use super::{native, register};
use crate::library::LibraryHandle;

pub fn install(library: &LibraryHandle) {
    let any1 = vec![ElementType::Any];
    let bool1 = vec![ElementType::Bool];

    register(library, "integer?", Arity::Fixed(1), Valency::Fixed(1), any1.clone(), bool1.clone(),
        native(|s| single(s, "integer?", |v| matches!(v, Value::Int(_)))));
    register(library, "float?", Arity::Fixed(1), Valency::Fixed(1), any1.clone(), bool1.clone(),
        native(|s| single(s, "float?", |v| matches!(v, Value::Float(_)))));
    register(library, "list?", Arity::Fixed(1), Valency::Fixed(1), any1.clone(), bool1.clone(),
        native(|s| single(s, "list?", |v| matches!(v, Value::List(_)))));
    register(library, "string?", Arity::Fixed(1), Valency::Fixed(1), any1.clone(), bool1.clone(),
        native(|s| single(s, "string?", |v| matches!(v, Value::String(_)))));
    register(library, "boolean?", Arity::Fixed(1), Valency::Fixed(1), any1.clone(), bool1.clone(),
        native(|s| single(s, "boolean?", |v| matches!(v, Value::Bool(_)))));

    register(library, "small?", Arity::Fixed(1), Valency::Fixed(1), any1.clone(), bool1.clone(),
        native(|s| {
            let (rest, v) = s.pop().ok_or_else(|| super::underflow("small?", 1, &s))?;
            let size = match &v {
                Value::List(items) => items.len(),
                Value::String(s) => s.chars().count(),
                Value::Int(i) => return Ok(rest.push(Value::Bool(*i < num_bigint::BigInt::from(2)))),
                other => return Err(super::type_error("small?", "a list, string or int", other)),
            };
            Ok(rest.push(Value::Bool(size < 2)))
        }));

    register(library, "sametype?", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Any, ElementType::Any], bool1,
        native(|s| {
            let (rest, b) = s.pop().ok_or_else(|| super::underflow("sametype?", 2, &s))?;
            let (rest, a) = rest.pop().ok_or_else(|| super::underflow("sametype?", 2, &rest))?;
            Ok(rest.push(Value::Bool(a.type_name() == b.type_name())))
        }));
}

fn single(stack: joy_core::Stack, name: &str, f: impl Fn(&Value) -> bool) -> Result<joy_core::Stack, joy_core::JoyError> {
    let (rest, v) = stack.pop().ok_or_else(|| super::underflow(name, 1, &stack))?;
    let result = f(&v);
    Ok(rest.push(Value::Bool(result)))
}
