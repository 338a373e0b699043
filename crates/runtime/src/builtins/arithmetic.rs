//! Arithmetic on the numeric tower: `Int`/`Float`/`Rational`. Mixed
//! `Int`/`Rational` operands promote to `Rational`; any `Float` operand
//! promotes the whole operation to `Float`.

use joy_core::{Arity, ElementType, JoyError, NativeCallable, Stack, Valency, Value};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use super::{native, register, type_error, underflow};
use crate::library::LibraryHandle;

fn as_rational(v: &Value) -> Option<BigRational> {
    match v {
        Value::Int(i) => Some(BigRational::from_integer(i.clone())),
        Value::Rational(r) => Some(r.clone()),
        _ => None,
    }
}

fn to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => i.to_f64(),
        Value::Float(f) => Some(*f),
        Value::Rational(r) => r.to_f64(),
        _ => None,
    }
}

fn pop2(name: &str, stack: &Stack) -> Result<(Stack, Value, Value), JoyError> {
    let (rest, b) = stack.pop().ok_or_else(|| underflow(name, 2, stack))?;
    let (rest, a) = rest.pop().ok_or_else(|| underflow(name, 2, stack))?;
    Ok((rest, a, b))
}

fn zero_div(name: &str) -> JoyError {
    JoyError::Stack { message: format!("`{name}`: division by zero"), op: Some(name.to_string()), span: None, stack_snapshot: vec![] }
}

fn numeric_binop(
    name: &'static str,
    int_op: fn(&BigInt, &BigInt) -> BigInt,
    float_op: fn(f64, f64) -> f64,
    rat_op: fn(&BigRational, &BigRational) -> BigRational,
) -> NativeCallable {
    native(move |s| {
        let (rest, a, b) = pop2(name, &s)?;
        let result = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => Value::Int(int_op(x, y)),
            (Value::Float(_), _) | (_, Value::Float(_)) => {
                let x = to_f64(&a).ok_or_else(|| type_error(name, "a number", &a))?;
                let y = to_f64(&b).ok_or_else(|| type_error(name, "a number", &b))?;
                Value::Float(float_op(x, y))
            }
            _ => {
                let x = as_rational(&a).ok_or_else(|| type_error(name, "a number", &a))?;
                let y = as_rational(&b).ok_or_else(|| type_error(name, "a number", &b))?;
                Value::Rational(rat_op(&x, &y))
            }
        };
        Ok(rest.push(result))
    })
}

pub fn install(library: &LibraryHandle) {
    let any2 = vec![ElementType::Any, ElementType::Any];
    let any1 = vec![ElementType::Any];

    register(library, "add", Arity::Fixed(2), Valency::Fixed(1), any2.clone(), any1.clone(),
        numeric_binop("add", |a, b| a + b, |a, b| a + b, |a, b| a + b));
    register(library, "sub", Arity::Fixed(2), Valency::Fixed(1), any2.clone(), any1.clone(),
        numeric_binop("sub", |a, b| a - b, |a, b| a - b, |a, b| a - b));
    register(library, "mul", Arity::Fixed(2), Valency::Fixed(1), any2.clone(), any1.clone(),
        numeric_binop("mul", |a, b| a * b, |a, b| a * b, |a, b| a * b));

    let div_call = native(|s| {
        let (rest, a, b) = pop2("div", &s)?;
        if matches!(a, Value::Float(_)) || matches!(b, Value::Float(_)) {
            let x = to_f64(&a).ok_or_else(|| type_error("div", "a number", &a))?;
            let y = to_f64(&b).ok_or_else(|| type_error("div", "a number", &b))?;
            return Ok(rest.push(Value::Float(x / y)));
        }
        let x = as_rational(&a).ok_or_else(|| type_error("div", "a number", &a))?;
        let y = as_rational(&b).ok_or_else(|| type_error("div", "a number", &b))?;
        if y.is_zero() {
            return Err(zero_div("div"));
        }
        Ok(rest.push(Value::Rational(x / y)))
    });
    register(library, "div", Arity::Fixed(2), Valency::Fixed(1), any2.clone(), any1.clone(), div_call);

    register(library, "//", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Int, ElementType::Int], vec![ElementType::Int],
        native(|s| {
            let (rest, a, b) = pop2("//", &s)?;
            let (Value::Int(x), Value::Int(y)) = (&a, &b) else {
                return Err(type_error("//", "two integers", &a));
            };
            if y.is_zero() {
                return Err(zero_div("//"));
            }
            Ok(rest.push(Value::Int(x.div_euclid(y))))
        }));

    register(library, "mod", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Int, ElementType::Int], vec![ElementType::Int],
        native(|s| {
            let (rest, a, b) = pop2("mod", &s)?;
            let (Value::Int(x), Value::Int(y)) = (&a, &b) else {
                return Err(type_error("mod", "two integers", &a));
            };
            if y.is_zero() {
                return Err(zero_div("mod"));
            }
            Ok(rest.push(Value::Int(x.rem_euclid(y))))
        }));
    register(library, "rem", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Int, ElementType::Int], vec![ElementType::Int],
        native(|s| {
            let (rest, a, b) = pop2("rem", &s)?;
            let (Value::Int(x), Value::Int(y)) = (&a, &b) else {
                return Err(type_error("rem", "two integers", &a));
            };
            if y.is_zero() {
                return Err(zero_div("rem"));
            }
            Ok(rest.push(Value::Int(x % y)))
        }));

    register(library, "neg", Arity::Fixed(1), Valency::Fixed(1), any1.clone(), any1.clone(),
        native(|s| {
            let (rest, a) = s.pop().ok_or_else(|| underflow("neg", 1, &s))?;
            let result = match a {
                Value::Int(i) => Value::Int(-i),
                Value::Float(f) => Value::Float(-f),
                Value::Rational(r) => Value::Rational(-r),
                other => return Err(type_error("neg", "a number", &other)),
            };
            Ok(rest.push(result))
        }));

    register(library, "abs", Arity::Fixed(1), Valency::Fixed(1), any1.clone(), any1.clone(),
        native(|s| {
            let (rest, a) = s.pop().ok_or_else(|| underflow("abs", 1, &s))?;
            let result = match a {
                Value::Int(i) => Value::Int(i.abs()),
                Value::Float(f) => Value::Float(f.abs()),
                Value::Rational(r) => Value::Rational(r.abs()),
                other => return Err(type_error("abs", "a number", &other)),
            };
            Ok(rest.push(result))
        }));

    register(library, "sign", Arity::Fixed(1), Valency::Fixed(1), any1.clone(), vec![ElementType::Int],
        native(|s| {
            let (rest, a) = s.pop().ok_or_else(|| underflow("sign", 1, &s))?;
            let n: i64 = match &a {
                Value::Int(i) if i.is_positive() => 1,
                Value::Int(i) if i.is_negative() => -1,
                Value::Int(_) => 0,
                Value::Rational(r) if r.is_positive() => 1,
                Value::Rational(r) if r.is_negative() => -1,
                Value::Rational(_) => 0,
                Value::Float(f) if *f > 0.0 => 1,
                Value::Float(f) if *f < 0.0 => -1,
                Value::Float(_) => 0,
                other => return Err(type_error("sign", "a number", other)),
            };
            Ok(rest.push(Value::Int(BigInt::from(n))))
        }));

    register(library, "min", Arity::Fixed(2), Valency::Fixed(1), any2.clone(), any1.clone(),
        native(|s| {
            let (rest, a, b) = pop2("min", &s)?;
            let x = to_f64(&a).ok_or_else(|| type_error("min", "a number", &a))?;
            let y = to_f64(&b).ok_or_else(|| type_error("min", "a number", &b))?;
            Ok(rest.push(if x <= y { a } else { b }))
        }));
    register(library, "max", Arity::Fixed(2), Valency::Fixed(1), any2, any1,
        native(|s| {
            let (rest, a, b) = pop2("max", &s)?;
            let x = to_f64(&a).ok_or_else(|| type_error("max", "a number", &a))?;
            let y = to_f64(&b).ok_or_else(|| type_error("max", "a number", &b))?;
            Ok(rest.push(if x >= y { a } else { b }))
        }));
}
