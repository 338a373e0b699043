//! Opt-in pre-step validation (§4.4): arity/type checks before dispatch,
//! plus the couple of operation-specific checks the spec calls out by name
//! (zero divisors, `div`-family; list/string bounds, `at`/`index`).

use std::collections::HashMap;
use std::rc::Rc;

use joy_core::{Arity, Combinator, ElementType, JoyError, Signature, Stack, Value};
use num_traits::ToPrimitive;

fn concrete_type_of(value: &Value) -> ElementType {
    match value {
        Value::Int(_) => ElementType::Int,
        Value::Float(_) => ElementType::Float,
        Value::Rational(_) => ElementType::Rational,
        Value::Bool(_) => ElementType::Bool,
        Value::String(_) => ElementType::String,
        Value::Symbol(_) => ElementType::Symbol,
        Value::List(_) => ElementType::List,
        Value::Dict(_) => ElementType::Dict,
        Value::Struct(s) => ElementType::Struct(Rc::from(String::from_utf8_lossy(&s.type_name).into_owned())),
        Value::Operation(_) => ElementType::Operation,
        Value::Error(_) => ElementType::Any,
    }
}

/// Checks one actual value against a declared element type, threading
/// type-variable bindings so every occurrence of the same variable name
/// within one invocation is required to agree.
fn element_matches(value: &Value, ty: &ElementType, bindings: &mut HashMap<Rc<str>, ElementType>) -> bool {
    match ty {
        ElementType::Any => true,
        ElementType::Var(name) => {
            let concrete = concrete_type_of(value);
            match bindings.get(name) {
                Some(bound) => *bound == concrete,
                None => {
                    bindings.insert(name.clone(), concrete);
                    true
                }
            }
        }
        ElementType::Struct(name) => matches!(value, Value::Struct(s) if s.type_name.as_ref() == name.as_bytes()),
        other => concrete_type_of(value) == *other,
    }
}

fn snapshot(stack: &Stack) -> Vec<String> {
    joy_core::stack::to_vec(stack).iter().map(|v| v.to_string()).collect()
}

fn stack_error(op: &str, message: String, stack: &Stack) -> JoyError {
    JoyError::Stack { message, op: Some(op.to_string()), span: None, stack_snapshot: snapshot(stack) }
}

/// Validates a combinator's top-of-stack shape before it runs (`i`, `dip`).
pub fn validate_combinator(comb: Combinator, op_name: &str, stack: &Stack) -> Result<(), JoyError> {
    match comb {
        Combinator::I => match stack.peek() {
            Some(Value::List(_)) => Ok(()),
            Some(_) => Err(stack_error(op_name, "`i` requires a quotation on top of the stack".to_string(), stack)),
            None => Err(stack_error(op_name, "`i` requires a quotation on top of the stack".to_string(), stack)),
        },
        Combinator::Dip => {
            let (rest, top) = stack
                .pop()
                .ok_or_else(|| stack_error(op_name, "`dip` requires a quotation and a value".to_string(), stack))?;
            if !matches!(top, Value::List(_)) {
                return Err(stack_error(op_name, "`dip` requires a quotation on top of the stack".to_string(), stack));
            }
            if rest.peek().is_none() {
                return Err(stack_error(op_name, "`dip` requires a second value below the quotation".to_string(), stack));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn is_div_family(name: &str) -> bool {
    matches!(name, "div" | "/" | "mod" | "rem" | "//")
}

fn is_index_family(name: &str) -> bool {
    matches!(name, "at" | "index")
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Int(i) => i == &num_bigint::BigInt::from(0),
        Value::Float(f) => *f == 0.0,
        Value::Rational(r) => r.numer() == &num_bigint::BigInt::from(0),
        _ => false,
    }
}

fn validate_index(name: &str, values: &[Value], stack: &Stack) -> Result<(), JoyError> {
    let len = match values.first() {
        Some(Value::List(items)) => items.len(),
        Some(Value::String(s)) => s.chars().count(),
        _ => return Ok(()),
    };
    let Some(Value::Int(idx)) = values.get(1) else { return Ok(()) };
    let idx_i64: i64 = match idx.to_i64() {
        Some(v) => v,
        None => return Err(stack_error(name, format!("`{name}`: index out of range"), stack)),
    };
    if idx_i64 < 0 || idx_i64 as usize >= len {
        return Err(stack_error(name, format!("`{name}`: index {idx_i64} out of bounds for length {len}"), stack));
    }
    Ok(())
}

/// Validates a native function's declared signature before dispatch: stack
/// depth, per-argument element types, and the two named special cases.
pub fn validate_function(name: &str, signature: &Signature, stack: &Stack) -> Result<(), JoyError> {
    let needed = match signature.arity {
        Arity::Fixed(n) => n,
        _ => return Ok(()),
    };
    let values = joy_core::stack::to_vec(stack);
    if values.len() < needed {
        return Err(stack_error(
            name,
            format!("`{name}` needs {needed} argument(s), found {}", values.len()),
            stack,
        ));
    }
    let mut bindings = HashMap::new();
    for (i, ty) in signature.inputs.iter().enumerate() {
        if i >= values.len() {
            break;
        }
        if !element_matches(&values[i], ty, &mut bindings) {
            return Err(stack_error(
                name,
                format!("`{name}` expected {ty:?} at position {i}, found {}", values[i].type_name()),
                stack,
            ));
        }
    }
    if is_div_family(name) {
        if let Some(top) = values.first() {
            if is_zero(top) {
                return Err(stack_error(name, format!("`{name}`: division by zero"), stack));
            }
        }
    }
    if is_index_family(name) {
        validate_index(name, &values, stack)?;
    }
    Ok(())
}
