//! Operation records and linked programs.
//!
//! An `Operation` is a tagged reference to something runnable: a native
//! function, a combinator, or an `Execute` pointing at a named quotation's
//! (possibly still-unlinked) program. `Execute` targets go through a
//! `QuotationSlot` — a shared, mutable cell — so the three-pass linker can
//! register a forward reference before the body it points to has been
//! linked, then patch every `Execute` once linking finishes. After that the
//! slot is never written again.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::effect::Signature;
use crate::error::JoyError;
use crate::location::SourceSpan;
use crate::stack::Stack;
use crate::value::Value;

/// One already-linked term: either a literal to push, or an operation to
/// dispatch.
#[derive(Clone)]
pub enum Item {
    Literal(Value),
    Op(Operation),
}

/// A linked program: the sequence an `Execute` operation resumes into the
/// program queue, or that `i`/`dip`/`step` prepend.
pub type Program = Vec<Item>;

/// A native callable already wrapped to the uniform `Stack -> Stack`
/// calling convention (arity/valency applied — see `joy-runtime`'s
/// `Library::add_function`).
pub type NativeCallable = Rc<dyn Fn(Stack) -> Result<Stack, JoyError>>;

pub struct NativeFunction {
    pub name: Rc<str>,
    pub signature: Signature,
    pub call: NativeCallable,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction").field("name", &self.name).finish()
    }
}

/// The combinators, privileged over plain functions because they mutate
/// the program queue as well as the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    I,
    Dip,
    Step,
    Exec,
    Struct,
    Unstruct,
    /// The interactive continuation (`...`); reads a line from the
    /// external input collaborator. Specified for completeness, not
    /// exercised by embedding callers that don't wire one up.
    Continuation,
}

impl Combinator {
    pub fn joy_name(self) -> &'static str {
        match self {
            Combinator::I => "i",
            Combinator::Dip => "dip",
            Combinator::Step => "step",
            Combinator::Exec => "exec!",
            Combinator::Struct => "struct",
            Combinator::Unstruct => "unstruct",
            Combinator::Continuation => "...",
        }
    }
}

/// Shared, mutable indirection cell for an `Execute` target: `None` while
/// the quotation it names is still being linked (forward/self reference),
/// `Some` and immutable from then on.
pub type QuotationSlot = Rc<RefCell<Option<Rc<Program>>>>;

pub fn empty_slot() -> QuotationSlot {
    Rc::new(RefCell::new(None))
}

/// What an `Operation` dispatches to.
#[derive(Clone)]
pub enum OpTarget {
    Function(Rc<NativeFunction>),
    Combinator(Combinator),
    Execute(QuotationSlot),
}

impl OpTarget {
    /// A short tag for diagnostics, matching the three cases in the data
    /// model's Operation record.
    pub fn tag(&self) -> &'static str {
        match self {
            OpTarget::Function(_) => "function",
            OpTarget::Combinator(_) => "combinator",
            OpTarget::Execute(_) => "execute",
        }
    }
}

/// A tagged, runnable reference: the thing `Item::Op` carries.
#[derive(Clone)]
pub struct Operation {
    pub target: OpTarget,
    pub name: Rc<str>,
    pub location: SourceSpan,
}

impl Operation {
    pub fn function(name: Rc<str>, fun: Rc<NativeFunction>, location: SourceSpan) -> Self {
        Operation { target: OpTarget::Function(fun), name, location }
    }

    pub fn combinator(comb: Combinator, location: SourceSpan) -> Self {
        Operation { target: OpTarget::Combinator(comb), name: Rc::from(comb.joy_name()), location }
    }

    pub fn execute(name: Rc<str>, slot: QuotationSlot, location: SourceSpan) -> Self {
        Operation { target: OpTarget::Execute(slot), name, location }
    }

    pub fn is_combinator(&self, comb: Combinator) -> bool {
        matches!(self.target, OpTarget::Combinator(c) if c == comb)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Equality compares tag + target identity, per the data model: two
/// `Function`/`Execute` operations are equal only if they share the same
/// underlying `Rc`; combinators compare by kind.
impl PartialEq for Operation {
    fn eq(&self, other: &Self) -> bool {
        match (&self.target, &other.target) {
            (OpTarget::Function(a), OpTarget::Function(b)) => Rc::ptr_eq(a, b),
            (OpTarget::Combinator(a), OpTarget::Combinator(b)) => a == b,
            (OpTarget::Execute(a), OpTarget::Execute(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Visibility of a library-registered quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    /// Linkable only from within the declaring module's own link pass
    /// (library overlay), never exported.
    Local,
}

/// A library-registered named program.
#[derive(Clone)]
pub struct Quotation {
    pub program: QuotationSlot,
    pub location: SourceSpan,
    pub signature: Option<Signature>,
    pub visibility: Visibility,
    pub module: Option<Rc<str>>,
}

impl Quotation {
    pub fn is_linked(&self) -> bool {
        self.program.borrow().is_some()
    }
}
