//! The cooperative program-queue interpreter (§4.6): a FIFO of pending
//! items, popped from the front, with combinators allowed to prepend
//! further items when they run.

use std::collections::VecDeque;

use joy_core::{Item, JoyError, Operation, OpTarget, Program, Stack, Value};

use crate::combinators;
use crate::env::Env;
use crate::validate;

fn attach(err: JoyError, op: &Operation) -> JoyError {
    match err {
        JoyError::Stack { message, op: None, span, stack_snapshot } => JoyError::Stack {
            message,
            op: Some(op.name.to_string()),
            span: span.or_else(|| Some(op.location.clone())),
            stack_snapshot,
        },
        JoyError::Assertion { op: None, span } => {
            JoyError::Assertion { op: Some(op.name.to_string()), span: span.or_else(|| Some(op.location.clone())) }
        }
        JoyError::Runtime { op: o, message, span } if o.is_empty() => {
            JoyError::Runtime { op: op.name.to_string(), message, span: span.or_else(|| Some(op.location.clone())) }
        }
        other => other,
    }
}

fn dispatch(op: Operation, queue: &mut VecDeque<Item>, stack: Stack, env: &Env) -> Result<Stack, JoyError> {
    tracing::trace!(name = %op.name, tag = ?op.target.tag(), "dispatching operation");
    match &op.target {
        OpTarget::Function(fun) => {
            if env.validate {
                validate::validate_function(&op.name, &fun.signature, &stack)?;
            }
            (fun.call)(stack).map_err(|e| attach(e, &op))
        }
        OpTarget::Combinator(comb) => {
            let comb = *comb;
            combinators::apply(&op, comb, queue, stack, env).map_err(|e| attach(e, &op))
        }
        OpTarget::Execute(slot) => {
            let program = slot.borrow().clone();
            match program {
                Some(program) => {
                    for item in program.iter().rev() {
                        queue.push_front(item.clone());
                    }
                    Ok(stack)
                }
                None => Err(JoyError::Name {
                    token: op.name.to_string(),
                    message: "quotation referenced before it finished linking".to_string(),
                    span: Some(op.location.clone()),
                }),
            }
        }
    }
}

/// Executes exactly one item from the front of `queue` against `stack`,
/// returning the stack unchanged if the queue was already empty.
pub fn step(queue: &mut VecDeque<Item>, stack: Stack, env: &Env) -> Result<Stack, JoyError> {
    let Some(item) = queue.pop_front() else { return Ok(stack) };
    match item {
        Item::Literal(Value::Symbol(s)) if s.as_ref() == b"ABORT" => {
            tracing::warn!("ABORT encountered, terminating run");
            Err(JoyError::Runtime { op: "ABORT".to_string(), message: "execution aborted".to_string(), span: None })
        }
        Item::Literal(Value::Symbol(s)) if s.as_ref() == b"BREAK" => {
            tracing::debug!(pending = queue.len(), "BREAK encountered, discarding remaining queue");
            queue.clear();
            Ok(stack)
        }
        Item::Literal(v) => Ok(stack.push(v)),
        Item::Op(op) => dispatch(op, queue, stack, env),
    }
}

/// Runs `program` to completion from `stack`, returning the final stack.
pub fn run_to_completion(program: Program, env: &Env, stack: Stack) -> Result<Stack, JoyError> {
    let mut interpreter = Interpreter::new(program, env.clone(), stack);
    interpreter.run()
}

/// Owns one interpretation frame: the pending queue, the current stack,
/// and the environment it dispatches against.
pub struct Interpreter {
    queue: VecDeque<Item>,
    stack: Stack,
    env: Env,
    steps: u64,
}

impl Interpreter {
    pub fn new(program: Program, env: Env, stack: Stack) -> Self {
        Interpreter { queue: program.into(), stack, env, steps: 0 }
    }

    pub fn step_once(&mut self) -> Result<bool, JoyError> {
        if self.queue.is_empty() {
            return Ok(false);
        }
        self.stack = step(&mut self.queue, self.stack.clone(), &self.env)?;
        self.steps += 1;
        Ok(true)
    }

    pub fn run(&mut self) -> Result<Stack, JoyError> {
        while self.step_once()? {}
        Ok(self.stack.clone())
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    pub fn queue_mut(&mut self) -> &mut VecDeque<Item> {
        &mut self.queue
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }
}
