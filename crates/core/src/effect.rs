//! Stack-effect shapes: the declared or derived `(inputs -- outputs)` of an
//! operation, used by the validator before every dispatch.

use std::rc::Rc;

/// How many values an operation consumes from the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Consumes exactly this many values from the top.
    Fixed(usize),
    /// Receives the whole stack, unconsumed (e.g. `stack`).
    WholeStack,
    /// Receives the stack expanded as variadic arguments (e.g. `unstack`'s
    /// dual, a function that reads every element positionally).
    Variadic,
}

impl Default for Arity {
    fn default() -> Self {
        Arity::Fixed(0)
    }
}

/// How many values an operation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valency {
    /// Pushes this many values, in order.
    Fixed(usize),
    /// Replaces the whole stack with the single returned value (only
    /// `unstack` is allowed to do this — see `DESIGN.md`).
    ReplaceStack,
}

impl Default for Valency {
    fn default() -> Self {
        Valency::Fixed(0)
    }
}

/// An element type appearing in a stack-effect signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    /// Open placeholder: matches any value.
    Any,
    /// A type variable; every occurrence in one invocation must bind to
    /// values of the same shape.
    Var(Rc<str>),
    Int,
    Float,
    Rational,
    Bool,
    String,
    Symbol,
    List,
    Dict,
    Struct(Rc<str>),
    Operation,
}

/// The full declared or derived stack effect of one operation.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub arity: Arity,
    pub valency: Valency,
    /// Top-down: index 0 is the top of stack.
    pub inputs: Vec<ElementType>,
    /// Top-down: index 0 is the top of stack.
    pub outputs: Vec<ElementType>,
}

impl Signature {
    pub fn new(arity: Arity, valency: Valency, inputs: Vec<ElementType>, outputs: Vec<ElementType>) -> Self {
        Signature { arity, valency, inputs, outputs }
    }
}
