//! Mutable-in-place dictionary operations. `dict` itself is a factory (see
//! `builtins::install`), not an operator — each reference produces a fresh,
//! empty `Value::Dict`.

use joy_core::{Arity, Dict, ElementType, JoyError, Stack, Symbol, Valency, Value};

use super::{native, register, type_error, underflow};
use crate::library::LibraryHandle;

fn pop_dict(name: &str, stack: &Stack) -> Result<(Stack, Dict), JoyError> {
    let (rest, v) = stack.pop().ok_or_else(|| underflow(name, 1, stack))?;
    match v {
        Value::Dict(d) => Ok((rest, d)),
        other => Err(type_error(name, "a dict", &other)),
    }
}

fn pop_key(name: &str, stack: &Stack) -> Result<(Stack, Symbol), JoyError> {
    let (rest, v) = stack.pop().ok_or_else(|| underflow(name, 1, stack))?;
    match v {
        Value::Symbol(s) => Ok((rest, s)),
        other => Err(type_error(name, "a symbol key", &other)),
    }
}

pub fn install(library: &LibraryHandle) {
    let any1 = vec![ElementType::Any];

    register(library, "dict-get", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Symbol, ElementType::Dict], any1.clone(),
        native(|s| {
            let (rest, key) = pop_key("dict-get", &s)?;
            let (rest, dict) = pop_dict("dict-get", &rest)?;
            let value = dict.borrow().get(&key).cloned().ok_or_else(|| JoyError::Stack {
                message: format!("`dict-get`: no entry for key `{}`", String::from_utf8_lossy(&key)),
                op: Some("dict-get".to_string()),
                span: None,
                stack_snapshot: vec![],
            })?;
            Ok(rest.push(value))
        }));

    register(library, "dict-put", Arity::Fixed(3), Valency::Fixed(1), vec![ElementType::Symbol, ElementType::Any, ElementType::Dict], vec![ElementType::Dict],
        native(|s| {
            let (rest, key) = pop_key("dict-put", &s)?;
            let (rest, value) = rest.pop().ok_or_else(|| underflow("dict-put", 3, &rest))?;
            let (rest, dict) = pop_dict("dict-put", &rest)?;
            dict.borrow_mut().insert(key, value);
            Ok(rest.push(Value::Dict(dict)))
        }));

    register(library, "dict-has?", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Symbol, ElementType::Dict], vec![ElementType::Bool],
        native(|s| {
            let (rest, key) = pop_key("dict-has?", &s)?;
            let (rest, dict) = pop_dict("dict-has?", &rest)?;
            let has = dict.borrow().contains_key(&key);
            Ok(rest.push(Value::Bool(has)))
        }));

    register(library, "dict-remove", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Symbol, ElementType::Dict], vec![ElementType::Dict],
        native(|s| {
            let (rest, key) = pop_key("dict-remove", &s)?;
            let (rest, dict) = pop_dict("dict-remove", &rest)?;
            dict.borrow_mut().remove(&key);
            Ok(rest.push(Value::Dict(dict)))
        }));

    register(library, "dict-size", Arity::Fixed(1), Valency::Fixed(1), vec![ElementType::Dict], vec![ElementType::Int],
        native(|s| {
            let (rest, dict) = pop_dict("dict-size", &s)?;
            let len = dict.borrow().len();
            Ok(rest.push(Value::Int(num_bigint::BigInt::from(len))))
        }));
}
