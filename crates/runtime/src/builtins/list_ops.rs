//! List construction and inspection. Lists double as quotations, so these
//! operate on the plain `Value::List` shape without caring what's inside.

use std::rc::Rc;

use joy_core::{Arity, ElementType, JoyError, Stack, Valency, Value};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::{native, register, type_error, underflow};
use crate::library::LibraryHandle;

fn pop_list(name: &str, stack: &Stack) -> Result<(Stack, Rc<Vec<Value>>), JoyError> {
    let (rest, v) = stack.pop().ok_or_else(|| underflow(name, 1, stack))?;
    match v {
        Value::List(items) => Ok((rest, items)),
        other => Err(type_error(name, "a list", &other)),
    }
}

pub fn install(library: &LibraryHandle) {
    let any1 = vec![ElementType::Any];
    let list1 = vec![ElementType::List];

    register(library, "cons", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::List, ElementType::Any], list1.clone(),
        native(|s| {
            let (rest, items) = pop_list("cons", &s)?;
            let (rest, head) = rest.pop().ok_or_else(|| underflow("cons", 2, &rest))?;
            let mut out = Vec::with_capacity(items.len() + 1);
            out.push(head);
            out.extend(items.iter().cloned());
            Ok(rest.push(Value::list(out)))
        }));

    register(library, "first", Arity::Fixed(1), Valency::Fixed(1), list1.clone(), any1.clone(),
        native(|s| {
            let (rest, items) = pop_list("first", &s)?;
            let head = items.first().cloned().ok_or_else(|| empty_list_error("first"))?;
            Ok(rest.push(head))
        }));

    register(library, "rest", Arity::Fixed(1), Valency::Fixed(1), list1.clone(), list1.clone(),
        native(|s| {
            let (rest, items) = pop_list("rest", &s)?;
            if items.is_empty() {
                return Err(empty_list_error("rest"));
            }
            Ok(rest.push(Value::list(items[1..].to_vec())))
        }));

    register(library, "length", Arity::Fixed(1), Valency::Fixed(1), list1.clone(), vec![ElementType::Int],
        native(|s| {
            let (rest, items) = pop_list("length", &s)?;
            Ok(rest.push(Value::Int(BigInt::from(items.len()))))
        }));

    register(library, "concat", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::List, ElementType::List], list1.clone(),
        native(|s| {
            let (rest, b) = pop_list("concat", &s)?;
            let (rest, a) = pop_list("concat", &rest)?;
            let mut out = a.as_ref().clone();
            out.extend(b.iter().cloned());
            Ok(rest.push(Value::list(out)))
        }));
    register(library, "append", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::List, ElementType::Any], list1.clone(),
        native(|s| {
            let (rest, items) = pop_list("append", &s)?;
            let (rest, item) = rest.pop().ok_or_else(|| underflow("append", 2, &rest))?;
            let mut out = items.as_ref().clone();
            out.push(item);
            Ok(rest.push(Value::list(out)))
        }));

    register(library, "reverse", Arity::Fixed(1), Valency::Fixed(1), list1.clone(), list1.clone(),
        native(|s| {
            let (rest, items) = pop_list("reverse", &s)?;
            let mut out = items.as_ref().clone();
            out.reverse();
            Ok(rest.push(Value::list(out)))
        }));

    register(library, "at", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Any, ElementType::Int], any1.clone(),
        native(|s| {
            let (rest, indexable) = s.pop().ok_or_else(|| underflow("at", 2, &s))?;
            let (rest, idx) = rest.pop().ok_or_else(|| underflow("at", 2, &rest))?;
            index_into("at", &idx, &indexable).map(|v| rest.push(v))
        }));
    register(library, "index", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Any, ElementType::Int], any1,
        native(|s| {
            let (rest, indexable) = s.pop().ok_or_else(|| underflow("index", 2, &s))?;
            let (rest, idx) = rest.pop().ok_or_else(|| underflow("index", 2, &rest))?;
            index_into("index", &idx, &indexable).map(|v| rest.push(v))
        }));

    register(library, "null", Arity::Fixed(1), Valency::Fixed(1), list1.clone(), vec![ElementType::Bool],
        native(|s| {
            let (rest, items) = pop_list("null", &s)?;
            Ok(rest.push(Value::Bool(items.is_empty())))
        }));
    register(library, "empty?", Arity::Fixed(1), Valency::Fixed(1), list1.clone(), vec![ElementType::Bool],
        native(|s| {
            let (rest, items) = pop_list("empty?", &s)?;
            Ok(rest.push(Value::Bool(items.is_empty())))
        }));

    register(library, "uncons", Arity::Fixed(1), Valency::Fixed(2), list1.clone(), vec![ElementType::List, ElementType::Any],
        native(|s| {
            let (rest, items) = pop_list("uncons", &s)?;
            let head = items.first().cloned().ok_or_else(|| empty_list_error("uncons"))?;
            let tail = Value::list(items[1..].to_vec());
            Ok(rest.push(head).push(tail))
        }));

    register(library, "last", Arity::Fixed(1), Valency::Fixed(1), list1.clone(), any1.clone(),
        native(|s| {
            let (rest, items) = pop_list("last", &s)?;
            let last = items.last().cloned().ok_or_else(|| empty_list_error("last"))?;
            Ok(rest.push(last))
        }));

    register(library, "remove", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Any, ElementType::List], list1.clone(),
        native(|s| {
            let (rest, target) = s.pop().ok_or_else(|| underflow("remove", 2, &s))?;
            let (rest, items) = pop_list("remove", &rest)?;
            let out: Vec<Value> = items.iter().filter(|v| **v != target).cloned().collect();
            Ok(rest.push(Value::list(out)))
        }));

    register(library, "take", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Int, ElementType::List], list1.clone(),
        native(|s| {
            let (rest, n) = pop_int("take", &s)?;
            let (rest, items) = pop_list("take", &rest)?;
            let n = clamp_count(n, items.len());
            Ok(rest.push(Value::list(items[..n].to_vec())))
        }));
    register(library, "drop", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::Int, ElementType::List], list1.clone(),
        native(|s| {
            let (rest, n) = pop_int("drop", &s)?;
            let (rest, items) = pop_list("drop", &rest)?;
            let n = clamp_count(n, items.len());
            Ok(rest.push(Value::list(items[n..].to_vec())))
        }));

    register(library, "member?", Arity::Fixed(2), Valency::Fixed(1), vec![ElementType::List, ElementType::Any], vec![ElementType::Bool],
        native(|s| {
            let (rest, items) = pop_list("member?", &s)?;
            let (rest, target) = rest.pop().ok_or_else(|| underflow("member?", 2, &rest))?;
            Ok(rest.push(Value::Bool(items.iter().any(|v| *v == target))))
        }));

    register(library, "sum", Arity::Fixed(1), Valency::Fixed(1), list1.clone(), any1.clone(),
        native(|s| {
            let (rest, items) = pop_list("sum", &s)?;
            fold_numeric("sum", &rest, &items, BigInt::from(0), |acc, n| acc + n)
        }));
    register(library, "product", Arity::Fixed(1), Valency::Fixed(1), list1, any1,
        native(|s| {
            let (rest, items) = pop_list("product", &s)?;
            fold_numeric("product", &rest, &items, BigInt::from(1), |acc, n| acc * n)
        }));
}

fn pop_int(name: &str, stack: &Stack) -> Result<(Stack, i64), JoyError> {
    let (rest, v) = stack.pop().ok_or_else(|| underflow(name, 2, stack))?;
    let Value::Int(n) = v else {
        return Err(type_error(name, "an integer count", &v));
    };
    let n = n.to_i64().ok_or_else(|| type_error(name, "an in-range count", &Value::Int(n)))?;
    Ok((rest, n))
}

fn clamp_count(n: i64, len: usize) -> usize {
    (n.max(0) as usize).min(len)
}

fn fold_numeric(
    name: &str,
    rest: &Stack,
    items: &[Value],
    seed: BigInt,
    op: fn(BigInt, &BigInt) -> BigInt,
) -> Result<Stack, JoyError> {
    let mut acc = seed;
    for v in items {
        match v {
            Value::Int(n) => acc = op(acc, n),
            other => return Err(type_error(name, "a list of integers", other)),
        }
    }
    Ok(rest.clone().push(Value::Int(acc)))
}

fn index_into(name: &str, idx: &Value, indexable: &Value) -> Result<Value, JoyError> {
    let Value::Int(n) = idx else {
        return Err(type_error(name, "an integer index", idx));
    };
    let i = n.to_i64().ok_or_else(|| type_error(name, "an in-range index", idx))?;
    match indexable {
        Value::List(items) => {
            if i < 0 || i as usize >= items.len() {
                return Err(bounds_error(name, i, items.len()));
            }
            Ok(items[i as usize].clone())
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            if i < 0 || i as usize >= chars.len() {
                return Err(bounds_error(name, i, chars.len()));
            }
            Ok(Value::string(chars[i as usize].to_string()))
        }
        other => Err(type_error(name, "a list or string", other)),
    }
}

fn empty_list_error(name: &str) -> JoyError {
    JoyError::Stack {
        message: format!("`{name}`: list is empty"),
        op: Some(name.to_string()),
        span: None,
        stack_snapshot: vec![],
    }
}

fn bounds_error(name: &str, i: i64, len: usize) -> JoyError {
    JoyError::Stack {
        message: format!("`{name}`: index {i} out of bounds for length {len}"),
        op: Some(name.to_string()),
        span: None,
        stack_snapshot: vec![],
    }
}
