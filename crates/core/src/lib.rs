//! Joy Core: the value, stack and operation model shared by the linker,
//! module system and interpreter in `joy-runtime`.
//!
//! # Modules
//!
//! - `value`: the `Value` union (Int, Float, Rational, Bool, String,
//!   Symbol, List, Dict, Struct, Operation, Error) plus struct types.
//! - `stack`: the persistent cons-stack and its primitive operations.
//! - `op`: operation records, linked programs and quotations.
//! - `effect`: stack-effect signatures (arity, valency, element types).
//! - `error`: the `JoyError` taxonomy.
//! - `location`: source spans threaded through tokens, ops and errors.

pub mod effect;
pub mod error;
pub mod location;
pub mod op;
pub mod stack;
pub mod value;

pub use effect::{Arity, ElementType, Signature, Valency};
pub use error::JoyError;
pub use location::SourceSpan;
pub use op::{
    Combinator, Item, NativeCallable, NativeFunction, OpTarget, Operation, Program, Quotation,
    QuotationSlot, Visibility, empty_slot,
};
pub use stack::Stack;
pub use value::{Dict, FieldDescriptor, StructInstance, StructType, Symbol, Value, symbol};
