//! String and symbol operations.

use joy_core::{Arity, ElementType, JoyError, Stack, Valency, Value};
use num_bigint::BigInt;

use super::{native, register, type_error, underflow};
use crate::library::LibraryHandle;

fn pop_string(name: &str, stack: &Stack) -> Result<(Stack, std::rc::Rc<str>), JoyError> {
    let (rest, v) = stack.pop().ok_or_else(|| underflow(name, 1, stack))?;
    match v {
        Value::String(s) => Ok((rest, s)),
        other => Err(type_error(name, "a string", &other)),
    }
}

pub fn install(library: &LibraryHandle) {
    let string2 = vec![ElementType::String, ElementType::String];
    let string1 = vec![ElementType::String];

    register(library, "string-concat", Arity::Fixed(2), Valency::Fixed(1), string2, string1.clone(),
        native(|s| {
            let (rest, b) = pop_string("string-concat", &s)?;
            let (rest, a) = pop_string("string-concat", &rest)?;
            Ok(rest.push(Value::string(format!("{a}{b}"))))
        }));

    register(library, "string-length", Arity::Fixed(1), Valency::Fixed(1), string1.clone(), vec![ElementType::Int],
        native(|s| {
            let (rest, a) = pop_string("string-length", &s)?;
            Ok(rest.push(Value::Int(BigInt::from(a.chars().count()))))
        }));

    register(library, "string-upper", Arity::Fixed(1), Valency::Fixed(1), string1.clone(), string1.clone(),
        native(|s| {
            let (rest, a) = pop_string("string-upper", &s)?;
            Ok(rest.push(Value::string(a.to_uppercase())))
        }));
    register(library, "string-lower", Arity::Fixed(1), Valency::Fixed(1), string1.clone(), string1.clone(),
        native(|s| {
            let (rest, a) = pop_string("string-lower", &s)?;
            Ok(rest.push(Value::string(a.to_lowercase())))
        }));

    register(library, "string-to-symbol", Arity::Fixed(1), Valency::Fixed(1), string1.clone(), vec![ElementType::Symbol],
        native(|s| {
            let (rest, a) = pop_string("string-to-symbol", &s)?;
            Ok(rest.push(Value::symbol(a.as_bytes().to_vec())))
        }));
    register(library, "symbol-to-string", Arity::Fixed(1), Valency::Fixed(1), vec![ElementType::Symbol], string1,
        native(|s| {
            let (rest, v) = s.pop().ok_or_else(|| underflow("symbol-to-string", 1, &s))?;
            match v {
                Value::Symbol(sym) => Ok(rest.push(Value::string(String::from_utf8_lossy(&sym).into_owned()))),
                other => Err(type_error("symbol-to-string", "a symbol", &other)),
            }
        }));
}
