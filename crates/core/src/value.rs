//! The Value universe: what Joy programs actually compute over.
//!
//! Heap-allocated variants share structure through `Rc`, matching the
//! reference-counted-sharing-of-immutable-quotations model the language
//! commits to instead of a tracing garbage collector. `Dict` is the one
//! mutable-in-place variant; everything else is structurally immutable
//! once built.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::error::JoyError;
use crate::op::Operation;

/// A byte-string literal (`'word`). Used both as struct type tags and as
/// dictionary keys, compared byte-exactly.
pub type Symbol = Rc<[u8]>;

pub fn symbol(bytes: impl Into<Vec<u8>>) -> Symbol {
    Rc::from(bytes.into().into_boxed_slice())
}

/// A mutable, in-place dictionary from symbol to value.
pub type Dict = Rc<RefCell<BTreeMap<Symbol, Value>>>;

/// Declaration-order field descriptor for a registered struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub label: Rc<str>,
    pub declared_type: Option<crate::effect::ElementType>,
}

/// A user-defined product type, keyed by its `Symbol` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    pub name: Symbol,
    pub arity: usize,
    /// Declaration order; field 0 is the struct's first field.
    pub fields: Rc<Vec<FieldDescriptor>>,
}

/// An immutable instance of a registered struct type.
#[derive(Debug, Clone)]
pub struct StructInstance {
    pub type_name: Symbol,
    /// Declaration order, matching `StructType::fields`.
    pub fields: Rc<Vec<Value>>,
}

impl PartialEq for StructInstance {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.fields == other.fields
    }
}

/// The discriminated value union every Joy term manipulates.
#[derive(Debug, Clone)]
pub enum Value {
    Int(BigInt),
    Float(f64),
    Rational(BigRational),
    Bool(bool),
    String(Rc<str>),
    Symbol(Symbol),
    /// Also the quotation form when used as code.
    List(Rc<Vec<Value>>),
    Dict(Dict),
    Struct(Rc<StructInstance>),
    Operation(Rc<Operation>),
    /// A captured failure, produced only by `exec!`.
    Error(Rc<JoyError>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn symbol(bytes: impl Into<Vec<u8>>) -> Value {
        Value::Symbol(symbol(bytes))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// A short, human-readable type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Rational(_) => "rational",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Struct(_) => "struct",
            Value::Operation(_) => "operation",
            Value::Error(_) => "error",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Rational(a), Value::Rational(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => *a.borrow() == *b.borrow(),
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Operation(a), Value::Operation(b)) => **a == **b,
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Rational(r) => write!(f, "{}⁄{}", r.numer(), r.denom()),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Symbol(s) => write!(f, "'{}", String::from_utf8_lossy(s)),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Dict(d) => write!(f, "<dict {} entries>", d.borrow().len()),
            Value::Struct(s) => write!(f, "{}{{...}}", String::from_utf8_lossy(&s.type_name)),
            Value::Operation(op) => write!(f, "{}", op.name),
            Value::Error(e) => write!(f, "<{}: {}>", e.kind_name(), e),
        }
    }
}
