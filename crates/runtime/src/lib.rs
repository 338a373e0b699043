//! Joy Runtime: the library, linker, module system and interpreter that
//! turn parsed Joy source into running programs.
//!
//! - [`library`] — the name registry (functions, constants, factories,
//!   quotations, struct types) and the link-time overlay.
//! - [`linker`] — turns one body's tokens into linked `Value`s.
//! - [`validate`] — opt-in pre-step type/arity checking.
//! - [`env`] — the interpreter's ambient per-run configuration.
//! - [`combinators`] — `i`, `dip`, `step`, `exec!`, `struct`, `unstruct`, `...`.
//! - [`interpreter`] — the program-queue interpreter.
//! - [`loader`] — installs one parsed library block's definitions.
//! - [`module`] — native and Joy-source module loaders.
//! - [`builtins`] — the always-registered built-in operator set.
//!
//! [`Runtime`] ties all of that into the one object an embedder talks to.

pub mod builtins;
pub mod combinators;
pub mod env;
pub mod interpreter;
pub mod library;
pub mod linker;
pub mod loader;
pub mod module;
pub mod validate;

use std::rc::Rc;

use joy_core::{JoyError, NativeCallable, NativeFunction, Quotation, Signature, Stack, Value};
use joy_syntax::ParserItem;

pub use env::{Env, InputSource};
pub use library::{Factory, JoySourceLoader, Library, LibraryHandle, NativeLoader};
pub use module::{NativeModule, NativeModuleRegistry, PathJoyLoader};

/// The result of running a batch of top-level terms: the final stack plus
/// how many interpreter steps it took to get there.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub stack: Stack,
    pub steps: u64,
}

/// The single object an embedding host talks to: owns the library, knows
/// how to load source (terms and library blocks alike), run it, and
/// extend the operator set from the host side.
pub struct Runtime {
    library: LibraryHandle,
    validate: bool,
    env_input: Option<Rc<dyn InputSource>>,
}

impl Runtime {
    /// A runtime with the built-in operator set installed and Joy-source
    /// modules resolved from `JOY_PATH` (falling back to `./lib`). No
    /// native extension modules are registered; use
    /// [`Runtime::with_native_modules`] to add some.
    pub fn new() -> Self {
        let library = Library::new_handle(None, Some(Rc::new(PathJoyLoader)));
        builtins::install(&library);
        Runtime { library, validate: false, env_input: None }
    }

    /// Like [`Runtime::new`], but native (host-extension) modules resolve
    /// through `registry` instead of failing with an `ImportError`.
    pub fn with_native_modules(registry: Rc<NativeModuleRegistry>) -> Self {
        let library = Library::new_handle(Some(registry), Some(Rc::new(PathJoyLoader)));
        builtins::install(&library);
        Runtime { library, validate: false, env_input: None }
    }

    /// Enables or disables pre-step validation for every subsequent `run`/
    /// `apply` call. Disabled by default, matching the reference
    /// interpreter's headless default.
    pub fn set_validate(&mut self, validate: bool) {
        self.validate = validate;
    }

    /// Supplies the collaborator the `...` combinator reads lines from.
    pub fn set_input_source(&mut self, input: Rc<dyn InputSource>) {
        self.env_input = Some(input);
    }

    fn env(&self) -> Env {
        let mut e = Env::new(self.library.clone());
        e.validate = self.validate;
        e.input = self.env_input.clone();
        e
    }

    /// Parses `source` and installs every library block it contains
    /// (struct types, private/public word definitions) into this
    /// runtime's library. Free-standing terms are linked (to surface
    /// name/parse errors eagerly) but not executed.
    pub fn load(&self, source: &str, filename: impl Into<Rc<str>> + Clone) -> Result<(), JoyError> {
        let items = joy_syntax::parse(source, filename.clone())?;
        for item in items {
            match item {
                ParserItem::Library(sections) => {
                    let namespace = sections.module.clone();
                    loader::install_library(&sections, &self.library, namespace.as_deref())?;
                }
                ParserItem::Term(tokens) => {
                    let overlay = library::with_overlay(&self.library);
                    let linker = linker::Linker::new(&overlay);
                    linker.link(&tokens)?;
                }
            }
        }
        Ok(())
    }

    /// Parses, links and runs every free-standing term in `source` against
    /// a fresh stack, threading the final stack from one term into the
    /// next. Library blocks are installed as a side effect, same as
    /// [`Runtime::load`].
    pub fn run(&self, source: &str, filename: impl Into<Rc<str>> + Clone) -> Result<RunOutcome, JoyError> {
        let items = joy_syntax::parse(source, filename.clone())?;
        let env = self.env();
        let mut stack = Stack::nil();
        let mut steps = 0u64;
        for item in items {
            match item {
                ParserItem::Library(sections) => {
                    let namespace = sections.module.clone();
                    loader::install_library(&sections, &self.library, namespace.as_deref())?;
                }
                ParserItem::Term(tokens) => {
                    let overlay = library::with_overlay(&self.library);
                    let linker = linker::Linker::new(&overlay);
                    let (values, _span) = linker.link(&tokens)?;
                    let program = linker::program_from_values(&values);
                    let mut interp = interpreter::Interpreter::new(program, env.clone(), stack);
                    stack = interp.run()?;
                    steps += interp.steps_taken();
                }
            }
        }
        Ok(RunOutcome { stack, steps })
    }

    /// Runs a single already-linked operation (as produced by the linker,
    /// or looked up via [`Runtime::get_quotation`]) against `stack`.
    pub fn apply(&self, op: Value, stack: Stack) -> Result<Stack, JoyError> {
        let program = linker::program_from_values(std::slice::from_ref(&op));
        interpreter::run_to_completion(program, &self.env(), stack)
    }

    /// Runs exactly one queued item; exposed for hosts that want to
    /// single-step a program (a debugger, a `...`-driven REPL).
    pub fn do_step(&self, queue: &mut std::collections::VecDeque<joy_core::Item>, stack: Stack) -> Result<Stack, JoyError> {
        interpreter::step(queue, stack, &self.env())
    }

    /// Registers a host-supplied native operation under a bare (unnamespaced)
    /// name, for embeddings that want to extend the built-in set directly
    /// rather than through a [`NativeModule`].
    pub fn register_operation(&self, name: impl Into<Rc<str>>, signature: Signature, call: NativeCallable) -> Result<(), JoyError> {
        let name = name.into();
        self.library.borrow_mut().add_function(name.clone(), NativeFunction { name, signature, call })
    }

    /// Registers a host-supplied factory under a bare name.
    pub fn register_factory(&self, name: impl Into<Rc<str>>, factory: Factory) {
        self.library.borrow_mut().add_factory(name, factory);
    }

    /// The declared or derived signature of a linked quotation, if one is
    /// registered under `name` and it carries a stack-effect annotation.
    pub fn get_signature(&self, name: &str) -> Option<Signature> {
        self.library.borrow().get_quotation(name).and_then(|q| q.signature)
    }

    /// Looks up a public quotation by name, e.g. to hand to [`Runtime::apply`].
    pub fn get_quotation(&self, name: &str) -> Option<Quotation> {
        self.library.borrow().get_quotation(name)
    }

    /// Every native operation name currently registered, built-ins and
    /// host-registered operations alike. Does not include quotations or
    /// not-yet-loaded native modules.
    pub fn list_operations(&self) -> Vec<Rc<str>> {
        self.library.borrow().function_names()
    }

    /// Converts a `Value::List` into the `Stack` it represents (top-first,
    /// matching `stack`/`unstack`'s convention).
    pub fn to_stack(&self, list: &Value) -> Result<Stack, JoyError> {
        match list {
            Value::List(items) => Ok(joy_core::stack::from_vec(items)),
            other => Err(JoyError::Type { message: format!("expected a list, found {}", other.type_name()), span: None }),
        }
    }

    /// The inverse of [`Runtime::to_stack`]: captures the current stack as
    /// a `Value::List`, top-first.
    pub fn from_stack(&self, stack: &Stack) -> Value {
        Value::list(joy_core::stack::to_vec(stack))
    }

    /// Direct access to the underlying library, for embeddings that need
    /// lower-level control than the façade offers (e.g. implementing a
    /// [`NativeModule`]-backed registry themselves).
    pub fn library(&self) -> &LibraryHandle {
        &self.library
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}
