//! Combinators (§4.5): the only operations that reach past the stack into
//! the program queue itself.

use std::collections::VecDeque;
use std::rc::Rc;

use joy_core::{Combinator, ElementType, FieldDescriptor, Item, JoyError, Operation, Stack, StructInstance, Symbol, Value};

use crate::env::Env;
use crate::linker::program_from_values;
use crate::validate::validate_combinator;

pub fn combinator_for_name(name: &str) -> Option<Combinator> {
    Some(match name {
        "i" => Combinator::I,
        "dip" => Combinator::Dip,
        "step" => Combinator::Step,
        "exec!" => Combinator::Exec,
        "struct" => Combinator::Struct,
        "unstruct" => Combinator::Unstruct,
        "..." => Combinator::Continuation,
        _ => return None,
    })
}

/// Pushes `items` onto the front of the queue, preserving their order (the
/// first item in `items` becomes the very next thing run).
fn prepend(queue: &mut VecDeque<Item>, items: Vec<Item>) {
    for item in items.into_iter().rev() {
        queue.push_front(item);
    }
}

fn type_error(op: &str, message: String, stack: &Stack) -> JoyError {
    JoyError::Stack {
        message,
        op: Some(op.to_string()),
        span: None,
        stack_snapshot: joy_core::stack::to_vec(stack).iter().map(|v| v.to_string()).collect(),
    }
}

fn pop_list(op: &str, stack: &Stack) -> Result<(Stack, Rc<Vec<Value>>), JoyError> {
    let (rest, top) = stack.pop().ok_or_else(|| type_error(op, format!("`{op}` needs a quotation"), stack))?;
    match top {
        Value::List(items) => Ok((rest, items)),
        other => Err(type_error(op, format!("`{op}` expected a quotation, found {}", other.type_name()), stack)),
    }
}

pub fn apply(
    op: &Operation,
    comb: Combinator,
    queue: &mut VecDeque<Item>,
    stack: Stack,
    env: &Env,
) -> Result<Stack, JoyError> {
    if env.validate {
        validate_combinator(comb, &op.name, &stack)?;
    }
    match comb {
        Combinator::I => {
            let (rest, q) = pop_list("i", &stack)?;
            prepend(queue, program_from_values(&q));
            Ok(rest)
        }
        Combinator::Dip => {
            let (rest, q) = pop_list("dip", &stack)?;
            let (rest, x) = rest.pop().ok_or_else(|| type_error("dip", "`dip` needs a second value".to_string(), &stack))?;
            let mut items = program_from_values(&q);
            items.push(Item::Literal(x));
            prepend(queue, items);
            Ok(rest)
        }
        Combinator::Step => {
            let (rest, q) = pop_list("step", &stack)?;
            let (rest, list) = rest.pop().ok_or_else(|| type_error("step", "`step` needs a list".to_string(), &stack))?;
            let Value::List(items) = list else {
                return Err(type_error("step", "`step` expected a list to iterate".to_string(), &stack));
            };
            if items.is_empty() {
                return Ok(rest);
            }
            let head = items[0].clone();
            let tail = Value::list(items[1..].to_vec());
            let mut prepended = vec![Item::Literal(head)];
            prepended.extend(program_from_values(&q));
            prepended.push(Item::Literal(tail));
            prepended.push(Item::Literal(Value::List(q.clone())));
            prepended.push(Item::Op(op.clone()));
            prepend(queue, prepended);
            Ok(rest)
        }
        Combinator::Exec => {
            let (rest, q) = pop_list("exec!", &stack)?;
            let program = program_from_values(&q);
            match crate::interpreter::run_to_completion(program, &env.with_validate(true), Stack::nil()) {
                Ok(result_stack) => {
                    let payload = Value::list(joy_core::stack::to_vec(&result_stack));
                    Ok(rest.push(payload).push(Value::Bool(true)))
                }
                Err(err) => {
                    let payload = Value::Error(err.into_shared());
                    Ok(rest.push(payload).push(Value::Bool(false)))
                }
            }
        }
        Combinator::Struct => apply_struct(op, &stack, env),
        Combinator::Unstruct => apply_unstruct(op, &stack),
        Combinator::Continuation => apply_continuation(queue, &stack, env),
    }
}

fn apply_struct(op: &Operation, stack: &Stack, env: &Env) -> Result<Stack, JoyError> {
    let (rest, type_name) = stack
        .pop()
        .ok_or_else(|| type_error("struct", "`struct` needs a type symbol".to_string(), stack))?;
    let Value::Symbol(type_name) = type_name else {
        return Err(type_error("struct", "`struct` expects a symbol naming the type".to_string(), stack));
    };
    let ty = env
        .library
        .borrow()
        .get_struct_type(&type_name)
        .ok_or_else(|| JoyError::UnknownStruct {
            name: String::from_utf8_lossy(&type_name).into_owned(),
            span: Some(op.location.clone()),
        })?;

    let mut popped = Vec::with_capacity(ty.arity);
    let mut cursor = rest;
    for _ in 0..ty.arity {
        let (next, value) = cursor
            .pop()
            .ok_or_else(|| type_error("struct", format!("`struct` needs {} field value(s)", ty.arity), stack))?;
        popped.push(value);
        cursor = next;
    }
    // `popped[0]` is the top-most of the N values, which binds to the last
    // field; reversing recovers declaration order.
    popped.reverse();
    for (value, field) in popped.iter().zip(ty.fields.iter()) {
        check_field(&ty.name, field, value)?;
    }
    let instance = StructInstance { type_name: ty.name.clone(), fields: Rc::new(popped) };
    Ok(cursor.push(Value::Struct(Rc::new(instance))))
}

fn check_field(type_name: &Symbol, field: &FieldDescriptor, value: &Value) -> Result<(), JoyError> {
    let Some(declared) = &field.declared_type else { return Ok(()) };
    let ok = match declared {
        ElementType::Any => true,
        ElementType::Var(_) => true,
        ElementType::Struct(name) => matches!(value, Value::Struct(s) if s.type_name.as_ref() == name.as_bytes()),
        ElementType::Int => matches!(value, Value::Int(_)),
        ElementType::Float => matches!(value, Value::Float(_)),
        ElementType::Rational => matches!(value, Value::Rational(_)),
        ElementType::Bool => matches!(value, Value::Bool(_)),
        ElementType::String => matches!(value, Value::String(_)),
        ElementType::Symbol => matches!(value, Value::Symbol(_)),
        ElementType::List => matches!(value, Value::List(_)),
        ElementType::Dict => matches!(value, Value::Dict(_)),
        ElementType::Operation => matches!(value, Value::Operation(_)),
    };
    if ok {
        Ok(())
    } else {
        Err(JoyError::Type {
            message: format!(
                "field `{}` of `{}` expected {:?}, found {}",
                field.label,
                String::from_utf8_lossy(type_name),
                declared,
                value.type_name()
            ),
            span: None,
        })
    }
}

fn apply_unstruct(_op: &Operation, stack: &Stack) -> Result<Stack, JoyError> {
    let (rest, value) = stack
        .pop()
        .ok_or_else(|| type_error("unstruct", "`unstruct` needs a struct".to_string(), stack))?;
    let Value::Struct(instance) = value else {
        return Err(type_error("unstruct", "`unstruct` expects a struct".to_string(), stack));
    };
    Ok(rest.pushed(instance.fields.iter().cloned()))
}

fn apply_continuation(queue: &mut VecDeque<Item>, stack: &Stack, env: &Env) -> Result<Stack, JoyError> {
    let Some(input) = &env.input else {
        return Err(JoyError::Runtime {
            op: "...".to_string(),
            message: "no interactive input source configured".to_string(),
            span: None,
        });
    };
    let Some(line) = input.read_line() else {
        return Ok(stack.clone());
    };
    let items = joy_syntax::parse(&line, "<interactive>").map_err(|e| JoyError::Runtime {
        op: "...".to_string(),
        message: e.to_string(),
        span: None,
    })?;
    let overlay = crate::library::with_overlay(&env.library);
    let linker = crate::linker::Linker::new(&overlay);
    let mut pending = Vec::new();
    for item in items {
        if let joy_syntax::ParserItem::Term(tokens) = item {
            let (values, _span) = linker.link(&tokens)?;
            pending.extend(program_from_values(&values));
        }
    }
    pending.push(Item::Op(Operation::combinator(Combinator::Continuation, joy_core::SourceSpan::default())));
    prepend(queue, pending);
    Ok(stack.clone())
}
