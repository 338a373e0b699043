//! Ordering and equality across the numeric tower plus strings/symbols.

use std::cmp::Ordering;

use joy_core::{Arity, ElementType, JoyError, Stack, Valency, Value};

use super::{native, register, type_error, underflow};
use crate::library::LibraryHandle;

fn pop2(name: &str, stack: &Stack) -> Result<(Stack, Value, Value), JoyError> {
    let (rest, b) = stack.pop().ok_or_else(|| underflow(name, 2, stack))?;
    let (rest, a) = rest.pop().ok_or_else(|| underflow(name, 2, stack))?;
    Ok((rest, a, b))
}

fn order(name: &str, a: &Value, b: &Value) -> Result<Ordering, JoyError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y).ok_or_else(|| type_error(name, "comparable numbers", a)),
        (Value::Rational(x), Value::Rational(y)) => Ok(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Symbol(x), Value::Symbol(y)) => Ok(x.cmp(y)),
        (Value::Int(_) | Value::Float(_) | Value::Rational(_), Value::Int(_) | Value::Float(_) | Value::Rational(_)) => {
            let x = to_f64(a).unwrap();
            let y = to_f64(b).unwrap();
            x.partial_cmp(&y).ok_or_else(|| type_error(name, "comparable numbers", a))
        }
        _ => Err(type_error(name, "two comparable values of the same kind", a)),
    }
}

fn to_f64(v: &Value) -> Option<f64> {
    use num_traits::ToPrimitive;
    match v {
        Value::Int(i) => i.to_f64(),
        Value::Float(f) => Some(*f),
        Value::Rational(r) => r.to_f64(),
        _ => None,
    }
}

fn compare_op(name: &'static str, f: fn(Ordering) -> bool) -> joy_core::NativeCallable {
    native(move |s| {
        let (rest, a, b) = pop2(name, &s)?;
        let ord = order(name, &a, &b)?;
        Ok(rest.push(Value::Bool(f(ord))))
    })
}

pub fn install(library: &LibraryHandle) {
    let any2 = vec![ElementType::Any, ElementType::Any];
    let bool1 = vec![ElementType::Bool];

    register(library, "lt", Arity::Fixed(2), Valency::Fixed(1), any2.clone(), bool1.clone(), compare_op("lt", |o| o == Ordering::Less));
    register(library, "gt", Arity::Fixed(2), Valency::Fixed(1), any2.clone(), bool1.clone(), compare_op("gt", |o| o == Ordering::Greater));
    register(library, "lte", Arity::Fixed(2), Valency::Fixed(1), any2.clone(), bool1.clone(), compare_op("lte", |o| o != Ordering::Greater));
    register(library, "gte", Arity::Fixed(2), Valency::Fixed(1), any2.clone(), bool1.clone(), compare_op("gte", |o| o != Ordering::Less));

    register(library, "equal?", Arity::Fixed(2), Valency::Fixed(1), any2.clone(), bool1.clone(),
        native(|s| {
            let (rest, a, b) = pop2("equal?", &s)?;
            Ok(rest.push(Value::Bool(a == b)))
        }));
    register(library, "differ?", Arity::Fixed(2), Valency::Fixed(1), any2, bool1,
        native(|s| {
            let (rest, a, b) = pop2("differ?", &s)?;
            Ok(rest.push(Value::Bool(a != b)))
        }));
}
