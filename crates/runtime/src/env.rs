//! The interpreter's ambient, per-run configuration: the library it
//! dispatches against, whether pre-step validation is enabled, and an
//! optional collaborator for the interactive continuation combinator.

use std::rc::Rc;

use crate::library::LibraryHandle;

/// Supplies lines of input to the `...` combinator. Non-essential: most
/// embeddings never configure one, and `...` raises a `RuntimeError`
/// without it.
pub trait InputSource {
    fn read_line(&self) -> Option<String>;
}

#[derive(Clone)]
pub struct Env {
    pub library: LibraryHandle,
    pub validate: bool,
    pub input: Option<Rc<dyn InputSource>>,
}

impl Env {
    pub fn new(library: LibraryHandle) -> Self {
        Env { library, validate: false, input: None }
    }

    pub fn with_validate(&self, validate: bool) -> Self {
        Env { library: self.library.clone(), validate, input: self.input.clone() }
    }
}
